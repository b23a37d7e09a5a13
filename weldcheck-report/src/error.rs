//! Error types for weldcheck-report

use thiserror::Error;
use weldcheck_core::Error as CoreError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image embed error: {0}")]
    ImageEmbed(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl From<ReportError> for CoreError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Io(e) => CoreError::Io(e),
            other => CoreError::Render(other.to_string()),
        }
    }
}
