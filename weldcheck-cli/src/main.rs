// Weldcheck command line interface
// Runs single-image inspections and inspects the defect knowledge base

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use weldcheck_core::PipelineConfig;
use weldcheck_detect::{DetectorConfig, YoloDetector};
use weldcheck_explain::{
    ExplanationBackend, KnowledgeBase, OllamaConfig, OllamaExplainer, StaticExplainer,
};
use weldcheck_pipeline::InspectionPipeline;
use weldcheck_report::{ReportAssembler, ReportConfig};

#[derive(Parser)]
#[command(name = "weldcheck")]
#[command(about = "Weld photograph inspection and PDF report generation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a weld photograph and write a PDF report
    Inspect {
        /// Path to the weld image (JPEG or PNG)
        image: PathBuf,

        /// Output PDF path
        #[arg(long, short, default_value = "report.pdf")]
        output: PathBuf,

        /// ONNX model weights
        #[arg(long, short)]
        model: Option<PathBuf>,

        /// Generate the explanation through a local Ollama instance
        #[arg(long)]
        ollama: bool,

        /// Ollama base URL
        #[arg(long, default_value = "http://localhost:11434")]
        ollama_url: String,
    },

    /// Show the knowledge-base entry for a defect label
    Knowledge {
        /// Defect label, e.g. "Porosity"
        label: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    match cli.command {
        Commands::Inspect {
            image,
            output,
            model,
            ollama,
            ollama_url,
        } => {
            inspect(image, output, model, ollama, ollama_url).await?;
        }
        Commands::Knowledge { label } => {
            show_knowledge(label.as_deref());
        }
    }

    Ok(())
}

async fn inspect(
    image: PathBuf,
    output: PathBuf,
    model: Option<PathBuf>,
    ollama: bool,
    ollama_url: String,
) -> anyhow::Result<()> {
    if !image.is_file() {
        anyhow::bail!("Image not found: {}", image.display());
    }

    let mut detector_config = DetectorConfig::default();
    if let Some(model) = model {
        detector_config.model_path = model;
    }

    let detector = Arc::new(YoloDetector::new(detector_config)?);
    let knowledge = Arc::new(KnowledgeBase::builtin());
    let explainer: Arc<dyn ExplanationBackend> = if ollama {
        let config = OllamaConfig {
            base_url: ollama_url,
            ..OllamaConfig::default()
        };
        Arc::new(OllamaExplainer::new(knowledge.clone(), config)?)
    } else {
        Arc::new(StaticExplainer::new(knowledge.clone()))
    };
    let assembler = ReportAssembler::new(ReportConfig::default(), knowledge)?;
    let pipeline = InspectionPipeline::new(
        detector,
        explainer,
        assembler,
        PipelineConfig::default(),
    )?;

    let run = pipeline.run(&image, &output, None).await?;

    println!("Verdict:     {}", run.assessment.verdict);
    println!("Defect:      {}", run.assessment.primary_defect_label());
    println!("Confidence:  {}", run.assessment.confidence_rounded());
    if run.detections.len() > 1 {
        println!("Detections:  {}", run.detections.len());
        for detection in &run.detections {
            println!("  - {} ({:.2})", detection.label, detection.confidence);
        }
    }
    println!("Report:      {}", run.report.path().display());

    Ok(())
}

fn show_knowledge(label: Option<&str>) {
    let knowledge = KnowledgeBase::builtin();

    match label {
        Some(label) => match knowledge.lookup(label) {
            Some(info) => {
                println!("{}", label);
                println!("  What it means:       {}", info.meaning);
                println!("  Why it occurs:       {}", info.cause);
                println!("  Weld acceptability:  {}", info.acceptability);
            }
            None => {
                println!("No knowledge-base entry for '{}'.", label);
                println!("Known labels:");
                for known in knowledge.labels() {
                    println!("  - {}", known);
                }
            }
        },
        None => {
            println!("Known defect labels:");
            for known in knowledge.labels() {
                println!("  - {}", known);
            }
        }
    }
}
