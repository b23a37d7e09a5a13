//! Error types for weldcheck-detect

use thiserror::Error;
use weldcheck_core::Error as CoreError;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DetectError>;

impl From<DetectError> for CoreError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::Decode(e) => CoreError::Input(format!("undecodable image: {}", e)),
            DetectError::Io(e) => CoreError::Io(e),
            other => CoreError::Detection(other.to_string()),
        }
    }
}
