//! Shared data types for the weld inspection pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One defect instance found in an image by the detection model.
///
/// Confidence is the raw model score in [0, 1]; it is never
/// recalibrated by later stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Binary pass/fail verdict for a weld image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeldVerdict {
    GoodWeld,
    BadWeld,
}

impl WeldVerdict {
    pub fn is_good(&self) -> bool {
        matches!(self, WeldVerdict::GoodWeld)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeldVerdict::GoodWeld => "Good Weld",
            WeldVerdict::BadWeld => "Bad Weld",
        }
    }
}

impl fmt::Display for WeldVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for choosing which detection drives explanation and report
/// content when more than one defect is found. The verdict itself is
/// independent of this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrimarySelection {
    /// First detection in the model's native output order.
    #[default]
    ModelOrder,
    /// Detection with the highest confidence score.
    HighestConfidence,
}

/// The assembled outcome of one pipeline run, consumed exactly once by
/// the report assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldAssessment {
    pub verdict: WeldVerdict,
    /// `None` if and only if the detection list was empty.
    pub primary_defect: Option<String>,
    /// Raw confidence of the primary detection; `None` when no defect
    /// was detected.
    pub confidence: Option<f32>,
    pub explanation: String,
    pub source_image: PathBuf,
    /// Client-supplied filename, kept as metadata only. Output paths
    /// never derive from it.
    pub original_filename: Option<String>,
}

impl WeldAssessment {
    /// Label used on the report; "None" when no defect was detected.
    pub fn primary_defect_label(&self) -> &str {
        self.primary_defect.as_deref().unwrap_or("None")
    }

    /// Whether the report should answer "Defect Detected?" with Yes.
    pub fn defect_detected(&self) -> bool {
        !matches!(self.primary_defect_label(), "None" | "Good Weld")
    }

    /// Confidence rounded to two decimals for the report; "0" when no
    /// defect was detected.
    pub fn confidence_rounded(&self) -> String {
        match self.confidence {
            Some(c) => format!("{:.2}", c),
            None => "0".to_string(),
        }
    }
}
