//! Report layout configuration

use serde::{Deserialize, Serialize};

/// Report assembler configuration.
///
/// The image display box is fixed regardless of the source resolution
/// or aspect ratio; non-matching aspect ratios render distorted. Known
/// limitation carried over from the report layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub title: String,
    /// Displayed image width in centimeters.
    pub image_width_cm: f32,
    /// Displayed image height in centimeters.
    pub image_height_cm: f32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Welding Inspection Report".to_string(),
            image_width_cm: 12.0,
            image_height_cm: 6.0,
        }
    }
}

impl ReportConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.title.is_empty() {
            return Err("Report title must not be empty".to_string());
        }

        if self.image_width_cm <= 0.0 || self.image_height_cm <= 0.0 {
            return Err("Image display size must be positive".to_string());
        }

        // A4 is 21.0 x 29.7 cm; leave room for margins and text.
        if self.image_width_cm > 19.0 || self.image_height_cm > 20.0 {
            return Err("Image display size does not fit an A4 page".to_string());
        }

        Ok(())
    }
}
