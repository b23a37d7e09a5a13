//! Pipeline orchestration

use crate::classify::{classify, select_primary};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use weldcheck_core::{Detection, Error, PipelineConfig, Result, WeldAssessment};
use weldcheck_detect::DefectDetector;
use weldcheck_explain::ExplanationBackend;
use weldcheck_report::{Report, ReportAssembler};

/// The outcome of one pipeline run. The full detection list is kept
/// even though only the primary detection is surfaced on the report.
#[derive(Debug)]
pub struct InspectionRun {
    pub assessment: WeldAssessment,
    pub detections: Vec<Detection>,
    pub report: Report,
}

/// Sequences detect -> classify -> explain -> assemble for one image.
///
/// Each stage failure aborts the run; nothing is retried and no
/// partial result is surfaced. Instances are cheap to share across
/// concurrent requests; all held state is read-only.
pub struct InspectionPipeline {
    detector: Arc<dyn DefectDetector>,
    explainer: Arc<dyn ExplanationBackend>,
    assembler: ReportAssembler,
    config: PipelineConfig,
}

impl InspectionPipeline {
    pub fn new(
        detector: Arc<dyn DefectDetector>,
        explainer: Arc<dyn ExplanationBackend>,
        assembler: ReportAssembler,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate().map_err(Error::Configuration)?;
        Ok(Self {
            detector,
            explainer,
            assembler,
            config,
        })
    }

    /// Run the full pipeline for `image`, writing the report to
    /// `output`. `original_filename` is carried as metadata only.
    pub async fn run(
        &self,
        image: &Path,
        output: &Path,
        original_filename: Option<String>,
    ) -> Result<InspectionRun> {
        debug!("Starting inspection run for {:?}", image);

        let detections = self.detector.detect(image)?;
        let verdict = classify(&detections);

        let primary = select_primary(&detections, self.config.primary_selection).cloned();
        let (primary_defect, confidence) = match &primary {
            Some(d) => (Some(d.label.clone()), Some(d.confidence)),
            None => (None, None),
        };

        let explanation = match &primary {
            Some(d) => self.explainer.explain(&d.label, Some(d.confidence)).await,
            None => self.config.no_defect_explanation.clone(),
        };

        let assessment = WeldAssessment {
            verdict,
            primary_defect,
            confidence,
            explanation,
            source_image: image.to_path_buf(),
            original_filename,
        };

        let report = self.assembler.assemble(&assessment, output)?;

        info!(
            "Inspection of {:?} finished: {} ({} detection(s))",
            image,
            verdict,
            detections.len()
        );

        Ok(InspectionRun {
            assessment,
            detections,
            report,
        })
    }
}
