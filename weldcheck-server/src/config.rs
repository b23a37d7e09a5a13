//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use weldcheck_core::PipelineConfig;
use weldcheck_detect::DetectorConfig;
use weldcheck_explain::OllamaConfig;
use weldcheck_report::ReportConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8000".
    pub bind_addr: String,
    /// Directory for uploaded images, one file per run id.
    pub uploads_dir: PathBuf,
    /// Directory for rendered reports, one file per run id.
    pub reports_dir: PathBuf,
    /// Upper bound on accepted upload size, in bytes.
    pub max_upload_bytes: usize,
    pub detector: DetectorConfig,
    pub pipeline: PipelineConfig,
    pub report: ReportConfig,
    /// When set, explanations come from Ollama instead of the static
    /// knowledge-base formatter.
    pub ollama: Option<OllamaConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            uploads_dir: PathBuf::from("uploads"),
            reports_dir: PathBuf::from("reports"),
            max_upload_bytes: 20 * 1024 * 1024,
            detector: DetectorConfig::default(),
            pipeline: PipelineConfig::default(),
            report: ReportConfig::default(),
            ollama: None,
        }
    }
}

impl ServerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_addr.is_empty() {
            return Err("Bind address must not be empty".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("Max upload size must be non-zero".to_string());
        }

        self.detector.validate()?;
        self.pipeline.validate()?;
        self.report.validate()?;
        if let Some(ollama) = &self.ollama {
            ollama.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert!(config.ollama.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_bind_addr() {
        let mut config = ServerConfig::default();
        config.bind_addr = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_upload_limit() {
        let mut config = ServerConfig::default();
        config.max_upload_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_cascades_to_components() {
        let mut config = ServerConfig::default();
        config.detector.input_size = (0, 0);
        assert!(config.validate().is_err());
    }
}
