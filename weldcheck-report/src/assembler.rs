//! PDF report assembly

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use weldcheck_core::WeldAssessment;
use weldcheck_explain::KnowledgeBase;

const CM_TO_PT: f32 = 28.3465;
const A4_WIDTH: i64 = 595;
const A4_HEIGHT: i64 = 842;
const LEFT_MARGIN: f32 = 50.0;

/// Cause line for non-defect labels.
const NO_DEFECT_CAUSE: &str = "No defect detected.";
/// Cause line for labels the knowledge base does not cover.
const FALLBACK_CAUSE: &str = "No detailed explanation available for this defect.";

/// Handle to a rendered report document. Write-once; never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    path: PathBuf,
}

impl Report {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Renders a `WeldAssessment` into a PDF. Everything fits one page
/// for typical explanations; long explanation text continues on
/// additional pages.
pub struct ReportAssembler {
    config: ReportConfig,
    knowledge: Arc<KnowledgeBase>,
}

impl ReportAssembler {
    pub fn new(config: ReportConfig, knowledge: Arc<KnowledgeBase>) -> Result<Self> {
        config.validate().map_err(ReportError::Config)?;
        Ok(Self { config, knowledge })
    }

    /// Write the report for `assessment` to `output`, overwriting any
    /// existing document there.
    pub fn assemble(&self, assessment: &WeldAssessment, output: &Path) -> Result<Report> {
        debug!("Assembling report for {:?}", assessment.source_image);

        let (jpeg_bytes, dims) = jpeg_payload(&assessment.source_image)?;
        let mut doc = self.build_document(assessment, jpeg_bytes, dims)?;
        doc.save(output)?;

        info!("Report written to {:?}", output);
        Ok(Report {
            path: output.to_path_buf(),
        })
    }

    /// The fixed-order text lines below the image block.
    fn detail_lines(&self, assessment: &WeldAssessment) -> Vec<String> {
        let detected = if assessment.defect_detected() {
            "Yes"
        } else {
            "No"
        };
        let label = assessment.primary_defect_label();
        vec![
            format!("Defect Detected? {}", detected),
            format!("Type of Defect: {}", label),
            format!("Cause of Defect: {}", self.cause_for(label)),
            format!("Confidence: {}", assessment.confidence_rounded()),
        ]
    }

    fn cause_for(&self, label: &str) -> String {
        if matches!(label, "None" | "Good Weld") {
            return NO_DEFECT_CAUSE.to_string();
        }
        self.knowledge
            .lookup(label)
            .map(|info| info.cause.clone())
            .unwrap_or_else(|| FALLBACK_CAUSE.to_string())
    }

    fn build_document(
        &self,
        assessment: &WeldAssessment,
        jpeg_bytes: Vec<u8>,
        (img_width, img_height): (u32, u32),
    ) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => img_width as i64,
                "Height" => img_height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg_bytes,
        ));

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_regular,
                "F2" => font_bold,
            },
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for content in self.page_contents(assessment) {
            let encoded = content.encode().map_err(|e| {
                ReportError::Render(format!("failed to encode page content: {}", e))
            })?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        Ok(doc)
    }

    /// Lay out the report content, starting a continuation page
    /// whenever the explanation block runs past the bottom margin.
    fn page_contents(&self, assessment: &WeldAssessment) -> Vec<Content> {
        let mut pages = Vec::new();
        let mut ops = Vec::new();

        text_line(&mut ops, "F2", 18.0, LEFT_MARGIN, 790.0, &self.config.title);
        text_line(&mut ops, "F2", 13.0, LEFT_MARGIN, 760.0, "Weld Image:");

        // The image is scaled to the configured display box regardless
        // of its native aspect ratio.
        let display_w = self.config.image_width_cm * CM_TO_PT;
        let display_h = self.config.image_height_cm * CM_TO_PT;
        let image_y = 750.0 - display_h - 10.0;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                Object::Real(display_w),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(display_h),
                Object::Real(LEFT_MARGIN),
                Object::Real(image_y),
            ],
        ));
        ops.push(Operation::new("Do", vec!["Im0".into()]));
        ops.push(Operation::new("Q", vec![]));

        let mut y = image_y - 30.0;
        for line in self.detail_lines(assessment) {
            text_line(&mut ops, "F1", 11.0, LEFT_MARGIN, y, &line);
            y -= 18.0;
        }

        y -= 10.0;
        text_line(&mut ops, "F2", 13.0, LEFT_MARGIN, y, "Explanation:");
        y -= 18.0;
        for line in assessment.explanation.lines() {
            if y < 50.0 {
                pages.push(Content {
                    operations: std::mem::take(&mut ops),
                });
                y = 790.0;
            }
            text_line(&mut ops, "F1", 10.0, LEFT_MARGIN, y, line);
            y -= 14.0;
        }

        pages.push(Content { operations: ops });
        pages
    }
}

fn text_line(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![font.into(), Object::Real(size)],
    ));
    ops.push(Operation::new(
        "Td",
        vec![Object::Real(x), Object::Real(y)],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(pdf_text(text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

// The base fonts only cover simple encodings; normalize dashes and
// drop anything wider than ASCII.
fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

/// Read the source image and return a JPEG payload plus pixel
/// dimensions. Non-JPEG sources are re-encoded; unreadable or
/// undecodable sources fail the assembly.
fn jpeg_payload(path: &Path) -> Result<(Vec<u8>, (u32, u32))> {
    let bytes = std::fs::read(path).map_err(|e| {
        ReportError::ImageEmbed(format!("cannot read source image {}: {}", path.display(), e))
    })?;

    let format = image::guess_format(&bytes).map_err(|e| {
        ReportError::ImageEmbed(format!("unrecognized image format: {}", e))
    })?;
    let img = image::load_from_memory_with_format(&bytes, format).map_err(|e| {
        ReportError::ImageEmbed(format!("undecodable source image: {}", e))
    })?;
    let dims = (img.width(), img.height());

    if format == ImageFormat::Jpeg {
        return Ok((bytes, dims));
    }

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, 90)
        .encode_image(&img.to_rgb8())
        .map_err(|e| ReportError::ImageEmbed(format!("JPEG re-encode failed: {}", e)))?;
    Ok((encoded, dims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use weldcheck_core::{WeldAssessment, WeldVerdict};

    fn assembler() -> ReportAssembler {
        ReportAssembler::new(
            ReportConfig::default(),
            Arc::new(KnowledgeBase::builtin()),
        )
        .unwrap()
    }

    fn write_jpeg(path: &Path) {
        let mut img = RgbImage::new(16, 16);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([120, 120, 120]);
        }
        img.save_with_format(path, ImageFormat::Jpeg).unwrap();
    }

    fn assessment(primary: Option<&str>, confidence: Option<f32>, image: &Path) -> WeldAssessment {
        WeldAssessment {
            verdict: if primary.is_some() {
                WeldVerdict::BadWeld
            } else {
                WeldVerdict::GoodWeld
            },
            primary_defect: primary.map(|s| s.to_string()),
            confidence,
            explanation: "No defect detected.".to_string(),
            source_image: image.to_path_buf(),
            original_filename: None,
        }
    }

    #[test]
    fn test_detail_lines_good_weld() {
        let a = assessment(None, None, Path::new("weld.jpg"));
        let lines = assembler().detail_lines(&a);
        assert_eq!(lines[0], "Defect Detected? No");
        assert_eq!(lines[1], "Type of Defect: None");
        assert_eq!(lines[2], "Cause of Defect: No defect detected.");
        assert_eq!(lines[3], "Confidence: 0");
    }

    #[test]
    fn test_detail_lines_porosity() {
        let a = assessment(Some("Porosity"), Some(0.91), Path::new("weld.jpg"));
        let lines = assembler().detail_lines(&a);
        assert_eq!(lines[0], "Defect Detected? Yes");
        assert_eq!(lines[1], "Type of Defect: Porosity");
        assert_eq!(
            lines[2],
            "Cause of Defect: Poor shielding gas or contaminated surface"
        );
        assert_eq!(lines[3], "Confidence: 0.91");
    }

    #[test]
    fn test_detail_lines_unknown_label_fallback_cause() {
        let a = assessment(Some("Warping"), Some(0.40), Path::new("weld.jpg"));
        let lines = assembler().detail_lines(&a);
        assert_eq!(lines[0], "Defect Detected? Yes");
        assert_eq!(lines[1], "Type of Defect: Warping");
        assert_eq!(
            lines[2],
            "Cause of Defect: No detailed explanation available for this defect."
        );
    }

    #[test]
    fn test_detail_lines_confidence_rounding() {
        let a = assessment(Some("Crack"), Some(0.8675), Path::new("weld.jpg"));
        let lines = assembler().detail_lines(&a);
        assert_eq!(lines[3], "Confidence: 0.87");
    }

    #[test]
    fn test_detail_lines_deterministic() {
        let a = assessment(Some("Crack"), Some(0.5), Path::new("weld.jpg"));
        assert_eq!(assembler().detail_lines(&a), assembler().detail_lines(&a));
    }

    #[test]
    fn test_pdf_text_sanitizes_dashes() {
        assert_eq!(pdf_text("Not acceptable \u{2013} reduces strength"),
                   "Not acceptable - reduces strength");
        assert_eq!(pdf_text("plain"), "plain");
    }

    #[test]
    fn test_assemble_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("weld.jpg");
        write_jpeg(&image);
        let output = dir.path().join("report.pdf");

        let a = assessment(Some("Porosity"), Some(0.91), &image);
        let report = assembler().assemble(&a, &output).unwrap();
        assert_eq!(report.path(), output);

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_assemble_overwrites_silently() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("weld.jpg");
        write_jpeg(&image);
        let output = dir.path().join("report.pdf");
        std::fs::write(&output, b"stale").unwrap();

        let a = assessment(None, None, &image);
        assembler().assemble(&a, &output).unwrap();
        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_assemble_missing_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = assessment(None, None, &dir.path().join("missing.jpg"));
        let err = assembler()
            .assemble(&a, &dir.path().join("report.pdf"))
            .unwrap_err();
        match err {
            ReportError::ImageEmbed(msg) => assert!(msg.contains("cannot read")),
            _ => panic!("Expected ImageEmbed error"),
        }
    }

    #[test]
    fn test_assemble_corrupt_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("weld.jpg");
        std::fs::write(&image, b"not an image at all").unwrap();
        let a = assessment(None, None, &image);
        let err = assembler()
            .assemble(&a, &dir.path().join("report.pdf"))
            .unwrap_err();
        assert!(matches!(err, ReportError::ImageEmbed(_)));
    }

    #[test]
    fn test_assemble_short_explanation_is_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("weld.jpg");
        write_jpeg(&image);
        let output = dir.path().join("report.pdf");

        let a = assessment(Some("Porosity"), Some(0.91), &image);
        assembler().assemble(&a, &output).unwrap();

        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_assemble_long_explanation_continues_on_new_pages() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("weld.jpg");
        write_jpeg(&image);
        let output = dir.path().join("report.pdf");

        let mut a = assessment(Some("Porosity"), Some(0.91), &image);
        a.explanation = (0..200)
            .map(|i| format!("Explanation line {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        assembler().assemble(&a, &output).unwrap();

        let doc = Document::load(&output).unwrap();
        assert!(doc.get_pages().len() >= 2);
    }

    #[test]
    fn test_jpeg_payload_reports_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("weld.png");
        let mut img = RgbImage::new(8, 12);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([40, 40, 40]);
        }
        img.save_with_format(&image, ImageFormat::Png).unwrap();

        let (bytes, dims) = jpeg_payload(&image).unwrap();
        assert_eq!(dims, (8, 12));
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_assemble_png_source_reencoded() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("weld.png");
        let mut img = RgbImage::new(8, 8);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([10, 200, 30]);
        }
        img.save_with_format(&image, ImageFormat::Png).unwrap();

        let a = assessment(None, None, &image);
        let output = dir.path().join("report.pdf");
        assembler().assemble(&a, &output).unwrap();
        assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF"));
    }
}
