//! weldcheck-pipeline: weld status classification and orchestration
//!
//! Sequences detection, classification, explanation and report
//! assembly for a single image. The only component aware of all
//! others; every collaborator is dependency-injected at construction.

pub mod classify;
pub mod pipeline;

pub use classify::{classify, select_primary};
pub use pipeline::{InspectionPipeline, InspectionRun};
