//! weldcheck-detect: Detection Adapter for the weld inspection pipeline
//!
//! Wraps an ONNX weld-defect detection model and turns raw model output
//! into a normalized list of (label, confidence) detections. Candidate
//! detections below a fixed confidence floor are discarded before they
//! reach the rest of the pipeline.

pub mod adapter;
pub mod config;
pub mod error;
mod tensor;
pub mod weights;
pub mod yolo;

pub use adapter::DefectDetector;
pub use config::DetectorConfig;
pub use error::{DetectError, Result};
pub use yolo::YoloDetector;
