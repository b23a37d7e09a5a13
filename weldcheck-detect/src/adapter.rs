//! Detection capability seam

use crate::error::DetectError;
use std::path::Path;
use weldcheck_core::Detection;

/// Capability contract: given a readable image, return the defect
/// detections the model found, already filtered by the confidence
/// floor and in the model's native output order.
///
/// Callers must not assume ordering by confidence. Labels are not
/// validated against the knowledge base here; unknown labels are legal
/// and handled downstream.
pub trait DefectDetector: Send + Sync {
    fn detect(&self, image: &Path) -> Result<Vec<Detection>, DetectError>;
}
