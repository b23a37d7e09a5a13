//! Weld status classification

use weldcheck_core::{Detection, PrimarySelection, WeldVerdict};

/// Reduce a detection list to a single verdict.
///
/// A binary gate favoring conservative failure: any detected instance
/// above the adapter's confidence floor fails the weld, regardless of
/// confidence value or defect type. No severity weighting.
pub fn classify(detections: &[Detection]) -> WeldVerdict {
    if detections.is_empty() {
        WeldVerdict::GoodWeld
    } else {
        WeldVerdict::BadWeld
    }
}

/// Pick the detection that drives explanation and report content.
/// Returns `None` exactly when the list is empty.
pub fn select_primary(
    detections: &[Detection],
    policy: PrimarySelection,
) -> Option<&Detection> {
    match policy {
        PrimarySelection::ModelOrder => detections.first(),
        PrimarySelection::HighestConfidence => detections.iter().max_by(|a, b| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}
