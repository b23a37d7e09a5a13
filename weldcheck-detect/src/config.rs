//! Configuration for the detection adapter

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fixed confidence floor below which candidate detections are
/// discarded. A deployment constant, not a per-call parameter.
pub const CONFIDENCE_FLOOR: f32 = 0.25;

/// Detection adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// ONNX weight file. Relative names are resolved under
    /// `model_dir`.
    pub model_path: PathBuf,
    /// Directory holding model weights.
    pub model_dir: PathBuf,
    /// Expected SHA-256 of the weight file, hex-encoded. Skipped when
    /// `None`.
    pub model_sha256: Option<String>,
    /// Model input size (width, height).
    pub input_size: (u32, u32),
    /// Confidence floor applied before detections are returned.
    pub confidence_floor: f32,
    /// IoU threshold for non-maximum suppression.
    pub iou_threshold: f32,
    /// Upper bound on detections returned per image.
    pub max_detections: usize,
    /// Class names in model output order.
    pub class_names: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let model_dir = dirs::home_dir()
            .map(|mut p| {
                p.push(".weldcheck");
                p.push("models");
                p
            })
            .unwrap_or_else(|| PathBuf::from("./models"));

        Self {
            model_path: PathBuf::from("best.onnx"),
            model_dir,
            model_sha256: None,
            input_size: (640, 640),
            confidence_floor: CONFIDENCE_FLOOR,
            iou_threshold: 0.45,
            max_detections: 100,
            class_names: vec![
                "Porosity".to_string(),
                "Crack".to_string(),
                "Lack of Fusion".to_string(),
                "Undercut".to_string(),
            ],
        }
    }
}

impl DetectorConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.input_size.0 == 0 || self.input_size.1 == 0 {
            return Err("Input size must be non-zero".to_string());
        }

        let total_pixels = self
            .input_size
            .0
            .checked_mul(self.input_size.1)
            .ok_or_else(|| "Input size would cause integer overflow".to_string())?;
        if total_pixels > 100_000_000 {
            return Err("Input size too large (max 100M pixels)".to_string());
        }

        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err("Confidence floor must be within [0, 1]".to_string());
        }

        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err("IoU threshold must be within [0, 1]".to_string());
        }

        if self.max_detections == 0 {
            return Err("Max detections must be at least 1".to_string());
        }

        if self.class_names.is_empty() {
            return Err("Class name list must not be empty".to_string());
        }

        Ok(())
    }
}
