//! ONNX YOLO weld-defect detector

use crate::adapter::DefectDetector;
use crate::config::DetectorConfig;
use crate::error::DetectError;
use crate::tensor::image_to_chw_tensor;
use crate::weights::resolve_weights;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};
use weldcheck_core::Detection;

/// One raw model candidate kept through postprocessing. The bounding
/// box is used for suppression only and is not surfaced.
#[derive(Debug, Clone)]
struct Candidate {
    index: usize,
    class_id: usize,
    confidence: f32,
    bbox: (f32, f32, f32, f32), // cx, cy, w, h
}

/// Weld-defect detector backed by an ONNX YOLO export.
///
/// The session is built once and shared behind a mutex; concurrent
/// runs serialize on inference, which is the dominant cost anyway.
pub struct YoloDetector {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    config: DetectorConfig,
}

impl YoloDetector {
    /// Load the model and prepare a reusable inference session.
    pub fn new(config: DetectorConfig) -> Result<Self, DetectError> {
        config.validate().map_err(DetectError::Config)?;
        let path = resolve_weights(&config)?;

        let session = Session::builder()
            .map_err(|e| DetectError::Model(format!("Failed to create session builder: {}", e)))?
            .with_log_level(LogLevel::Error)
            .map_err(|e| DetectError::Model(format!("Failed to configure session: {}", e)))?
            .commit_from_file(&path)
            .map_err(|e| {
                DetectError::Model(format!(
                    "Failed to load model from {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "images".to_string());
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| DetectError::Model("Model has no output tensors".to_string()))?;

        info!("YOLO weld-defect model loaded from {:?}", path);

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            config,
        })
    }
}

impl DefectDetector for YoloDetector {
    fn detect(&self, image: &Path) -> Result<Vec<Detection>, DetectError> {
        debug!("Running defect detection on {:?}", image);

        let img = image::open(image)?;
        let (width, height) = self.config.input_size;
        let input = image_to_chw_tensor(&img, width, height)?;

        let input_tensor = TensorRef::from_array_view(input.view())
            .map_err(|e| DetectError::Inference(format!("Failed to build input tensor: {}", e)))?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self
            .session
            .lock()
            .map_err(|_| DetectError::Inference("Failed to acquire session lock".to_string()))?;
        let outputs = session
            .run(inputs)
            .map_err(|e| DetectError::Inference(format!("ONNX Runtime inference failed: {}", e)))?;

        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                DetectError::Inference(format!("Failed to extract output tensor: {}", e))
            })?;

        let detections = postprocess(shape, data, &self.config)?;
        debug!("Detected {} defects", detections.len());
        Ok(detections)
    }
}

/// Decode an ultralytics-style output tensor `[1, 4 + classes, N]`
/// into detections: per candidate, the best class score; candidates
/// below the confidence floor are dropped, overlapping candidates of
/// the same class are suppressed, and the survivors are returned in
/// model-native candidate order.
fn postprocess(
    shape: &[i64],
    data: &[f32],
    config: &DetectorConfig,
) -> Result<Vec<Detection>, DetectError> {
    if shape.len() != 3 || shape[0] != 1 {
        return Err(DetectError::Inference(format!(
            "Unexpected output shape {:?}, expected [1, channels, candidates]",
            shape
        )));
    }

    let channels = shape[1] as usize;
    let num_candidates = shape[2] as usize;
    if channels < 5 {
        return Err(DetectError::Inference(format!(
            "Output has {} channels, expected at least 5",
            channels
        )));
    }
    if data.len() < channels * num_candidates {
        return Err(DetectError::Inference(
            "Output tensor smaller than its declared shape".to_string(),
        ));
    }

    let num_classes = channels - 4;
    let at = |row: usize, col: usize| data[row * num_candidates + col];

    let mut candidates = Vec::new();
    for j in 0..num_candidates {
        let mut best_class = 0usize;
        let mut best_score = 0.0f32;
        for c in 0..num_classes {
            let score = at(4 + c, j);
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }

        if !best_score.is_finite() || best_score < config.confidence_floor {
            continue;
        }

        if best_class >= config.class_names.len() {
            warn!(
                "Model produced class id {} outside the configured class list; skipping",
                best_class
            );
            continue;
        }

        let bbox = (at(0, j), at(1, j), at(2, j), at(3, j));
        if !bbox.0.is_finite() || !bbox.1.is_finite() || !bbox.2.is_finite() || !bbox.3.is_finite()
        {
            continue;
        }

        candidates.push(Candidate {
            index: j,
            class_id: best_class,
            confidence: best_score,
            bbox,
        });
    }

    let mut kept = suppress(candidates, config.iou_threshold);
    // Hand detections back in the model's native candidate order; the
    // pipeline contract forbids re-sorting by confidence.
    kept.sort_by_key(|c| c.index);
    kept.truncate(config.max_detections);

    Ok(kept
        .into_iter()
        .map(|c| Detection::new(config.class_names[c.class_id].clone(), c.confidence))
        .collect())
}

/// Per-class non-maximum suppression over center-format boxes.
fn suppress(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Candidate> = Vec::new();
    let mut suppressed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(candidates[i].clone());

        for j in (i + 1)..candidates.len() {
            if suppressed[j] || candidates[j].class_id != candidates[i].class_id {
                continue;
            }
            if iou(&candidates[i].bbox, &candidates[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// IoU of two center-format (cx, cy, w, h) boxes.
fn iou(a: &(f32, f32, f32, f32), b: &(f32, f32, f32, f32)) -> f32 {
    let (acx, acy, aw, ah) = *a;
    let (bcx, bcy, bw, bh) = *b;

    if aw <= 0.0 || ah <= 0.0 || bw <= 0.0 || bh <= 0.0 {
        return 0.0;
    }

    let ax1 = acx - aw / 2.0;
    let ay1 = acy - ah / 2.0;
    let ax2 = acx + aw / 2.0;
    let ay2 = acy + ah / 2.0;
    let bx1 = bcx - bw / 2.0;
    let by1 = bcy - bh / 2.0;
    let bx2 = bcx + bw / 2.0;
    let by2 = bcy + bh / 2.0;

    let ix1 = ax1.max(bx1);
    let iy1 = ay1.max(by1);
    let ix2 = ax2.min(bx2);
    let iy2 = ay2.min(by2);

    if ix2 <= ix1 || iy2 <= iy1 {
        return 0.0;
    }

    let inter = (ix2 - ix1) * (iy2 - iy1);
    let union = aw * ah + bw * bh - inter;
    if union <= 0.0 || !union.is_finite() {
        return 0.0;
    }

    let value = inter / union;
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a `[1, 4 + classes, N]` output tensor from candidate
    /// rows of (cx, cy, w, h, per-class scores).
    fn tensor(rows: &[(f32, f32, f32, f32, Vec<f32>)]) -> (Vec<i64>, Vec<f32>) {
        let num_classes = rows.first().map(|r| r.4.len()).unwrap_or(1);
        let channels = 4 + num_classes;
        let n = rows.len();
        let mut data = vec![0.0f32; channels * n];
        for (j, row) in rows.iter().enumerate() {
            data[j] = row.0;
            data[n + j] = row.1;
            data[2 * n + j] = row.2;
            data[3 * n + j] = row.3;
            for (c, score) in row.4.iter().enumerate() {
                data[(4 + c) * n + j] = *score;
            }
        }
        (vec![1, channels as i64, n as i64], data)
    }

    fn config() -> DetectorConfig {
        let mut config = DetectorConfig::default();
        config.class_names = vec!["Porosity".to_string(), "Crack".to_string()];
        config
    }

    #[test]
    fn test_postprocess_empty_output() {
        let (shape, data) = tensor(&[]);
        let detections = postprocess(&shape, &data, &config()).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_postprocess_applies_confidence_floor() {
        let (shape, data) = tensor(&[
            (100.0, 100.0, 20.0, 20.0, vec![0.91, 0.0]),
            (300.0, 300.0, 20.0, 20.0, vec![0.10, 0.0]),
        ]);
        let detections = postprocess(&shape, &data, &config()).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, "Porosity");
        assert!((detections[0].confidence - 0.91).abs() < 1e-6);
    }

    #[test]
    fn test_postprocess_floor_is_inclusive_above() {
        let (shape, data) = tensor(&[(100.0, 100.0, 20.0, 20.0, vec![0.25, 0.0])]);
        let detections = postprocess(&shape, &data, &config()).unwrap();
        assert_eq!(detections.len(), 1);
    }

    #[test]
    fn test_postprocess_picks_best_class() {
        let (shape, data) = tensor(&[(100.0, 100.0, 20.0, 20.0, vec![0.30, 0.80])]);
        let detections = postprocess(&shape, &data, &config()).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, "Crack");
    }

    #[test]
    fn test_postprocess_preserves_model_order() {
        // The higher-confidence candidate comes second in model order
        // and must stay second.
        let (shape, data) = tensor(&[
            (100.0, 100.0, 20.0, 20.0, vec![0.40, 0.0]),
            (300.0, 300.0, 20.0, 20.0, vec![0.0, 0.90]),
        ]);
        let detections = postprocess(&shape, &data, &config()).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].label, "Porosity");
        assert_eq!(detections[1].label, "Crack");
    }

    #[test]
    fn test_postprocess_suppresses_same_class_overlap() {
        let (shape, data) = tensor(&[
            (100.0, 100.0, 20.0, 20.0, vec![0.90, 0.0]),
            (101.0, 101.0, 20.0, 20.0, vec![0.60, 0.0]),
        ]);
        let detections = postprocess(&shape, &data, &config()).unwrap();
        assert_eq!(detections.len(), 1);
        assert!((detections[0].confidence - 0.90).abs() < 1e-6);
    }

    #[test]
    fn test_postprocess_keeps_cross_class_overlap() {
        let (shape, data) = tensor(&[
            (100.0, 100.0, 20.0, 20.0, vec![0.90, 0.0]),
            (101.0, 101.0, 20.0, 20.0, vec![0.0, 0.60]),
        ]);
        let detections = postprocess(&shape, &data, &config()).unwrap();
        assert_eq!(detections.len(), 2);
    }

    #[test]
    fn test_postprocess_skips_unknown_class_id() {
        let mut cfg = config();
        cfg.class_names = vec!["Porosity".to_string()];
        // Two class channels but only one configured name.
        let (shape, data) = tensor(&[(100.0, 100.0, 20.0, 20.0, vec![0.0, 0.90])]);
        let detections = postprocess(&shape, &data, &cfg).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_postprocess_respects_max_detections() {
        let mut cfg = config();
        cfg.max_detections = 1;
        let (shape, data) = tensor(&[
            (100.0, 100.0, 20.0, 20.0, vec![0.90, 0.0]),
            (300.0, 300.0, 20.0, 20.0, vec![0.0, 0.80]),
        ]);
        let detections = postprocess(&shape, &data, &cfg).unwrap();
        assert_eq!(detections.len(), 1);
    }

    #[test]
    fn test_postprocess_rejects_bad_shape() {
        let err = postprocess(&[1, 6], &[0.0; 6], &config()).unwrap_err();
        match err {
            DetectError::Inference(msg) => assert!(msg.contains("Unexpected output shape")),
            _ => panic!("Expected Inference error"),
        }
    }

    #[test]
    fn test_postprocess_rejects_short_data() {
        let err = postprocess(&[1, 6, 10], &[0.0; 6], &config()).unwrap_err();
        match err {
            DetectError::Inference(msg) => assert!(msg.contains("smaller")),
            _ => panic!("Expected Inference error"),
        }
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        assert_eq!(
            iou(&(0.0, 0.0, 10.0, 10.0), &(100.0, 100.0, 10.0, 10.0)),
            0.0
        );
    }

    #[test]
    fn test_iou_identical_boxes() {
        let b = (50.0, 50.0, 10.0, 10.0);
        assert!((iou(&b, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_degenerate_boxes() {
        assert_eq!(iou(&(0.0, 0.0, 0.0, 10.0), &(0.0, 0.0, 10.0, 10.0)), 0.0);
        assert_eq!(iou(&(0.0, 0.0, -5.0, 10.0), &(0.0, 0.0, 10.0, 10.0)), 0.0);
    }
}
