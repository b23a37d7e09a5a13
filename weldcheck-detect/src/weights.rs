//! Model weight resolution and integrity checks

use crate::config::DetectorConfig;
use crate::error::DetectError;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{debug, info};

/// Resolve the configured weight file to an on-disk path.
///
/// Absolute paths are used as-is; relative names are looked up under
/// the configured model directory. When an expected SHA-256 is
/// configured, the file content is verified before the path is handed
/// to the session builder.
pub fn resolve_weights(config: &DetectorConfig) -> Result<PathBuf, DetectError> {
    let path = if config.model_path.is_absolute() {
        config.model_path.clone()
    } else {
        config.model_dir.join(&config.model_path)
    };

    if !path.exists() {
        return Err(DetectError::Model(format!(
            "Model weights not found at {}; place the ONNX export there or set model_path",
            path.display()
        )));
    }

    if let Some(expected) = &config.model_sha256 {
        verify_sha256(&path, expected)?;
    }

    debug!("Resolved model weights to {:?}", path);
    Ok(path)
}

fn verify_sha256(path: &PathBuf, expected: &str) -> Result<(), DetectError> {
    let bytes = std::fs::read(path)?;
    let digest = hex::encode(Sha256::digest(&bytes));
    if !digest.eq_ignore_ascii_case(expected) {
        return Err(DetectError::Model(format!(
            "Model weight checksum mismatch for {}: expected {}, got {}",
            path.display(),
            expected,
            digest
        )));
    }
    info!("Model weight checksum verified for {:?}", path);
    Ok(())
}
