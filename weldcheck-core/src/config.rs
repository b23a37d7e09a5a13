//! Pipeline configuration

use crate::types::PrimarySelection;
use serde::{Deserialize, Serialize};

/// Configuration for one inspection pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Which detection is surfaced as the primary defect when several
    /// are found.
    pub primary_selection: PrimarySelection,
    /// Explanation text used when the detection list is empty.
    pub no_defect_explanation: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            primary_selection: PrimarySelection::ModelOrder,
            no_defect_explanation: "No defect detected.".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.no_defect_explanation.is_empty() {
            return Err("No-defect explanation text must not be empty".to_string());
        }
        Ok(())
    }
}
