use std::sync::Arc;
use tracing::info;
use weldcheck_explain::{
    ExplanationBackend, KnowledgeBase, OllamaConfig, OllamaExplainer, StaticExplainer,
};
use weldcheck_pipeline::InspectionPipeline;
use weldcheck_report::ReportAssembler;
use weldcheck_server::{create_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let mut config = ServerConfig::default();
    if let Ok(model) = std::env::var("WELDCHECK_MODEL") {
        config.detector.model_path = model.into();
    }
    if let Ok(bind) = std::env::var("WELDCHECK_BIND") {
        config.bind_addr = bind;
    }
    if std::env::var("WELDCHECK_OLLAMA").is_ok() {
        config.ollama = Some(OllamaConfig::default());
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    std::fs::create_dir_all(&config.uploads_dir)?;
    std::fs::create_dir_all(&config.reports_dir)?;

    info!("Loading weld-defect detection model...");
    let detector = Arc::new(weldcheck_detect::YoloDetector::new(config.detector.clone())?);

    let knowledge = Arc::new(KnowledgeBase::builtin());
    let explainer: Arc<dyn ExplanationBackend> = match &config.ollama {
        Some(ollama) => {
            info!("Explanations served by Ollama at {}", ollama.base_url);
            Arc::new(OllamaExplainer::new(knowledge.clone(), ollama.clone())?)
        }
        None => Arc::new(StaticExplainer::new(knowledge.clone())),
    };

    let assembler = ReportAssembler::new(config.report.clone(), knowledge)?;
    let pipeline = Arc::new(InspectionPipeline::new(
        detector,
        explainer,
        assembler,
        config.pipeline.clone(),
    )?);

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        pipeline,
        config: Arc::new(config),
    };
    let app = create_router(state);

    info!("Weldcheck listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
