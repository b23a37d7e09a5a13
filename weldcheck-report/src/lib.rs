//! weldcheck-report: PDF inspection report assembly
//!
//! Renders one `WeldAssessment` into a PDF with a fixed block order:
//! title, the source image scaled to a fixed display box, the
//! defect-detected line, defect type, cause, confidence, and the
//! explanation text. Explanations too long for the first page continue
//! on additional pages.

pub mod assembler;
pub mod config;
pub mod error;

pub use assembler::{Report, ReportAssembler};
pub use config::ReportConfig;
pub use error::{ReportError, Result};
