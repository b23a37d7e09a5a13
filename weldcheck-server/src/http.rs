//! HTTP routes: upload page, upload handling, report download

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;
use weldcheck_core::Error as CoreError;
use weldcheck_pipeline::InspectionPipeline;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InspectionPipeline>,
    pub config: Arc<ServerConfig>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(upload_page))
        .route("/upload-page", get(upload_page))
        .route("/upload", post(upload_image))
        .route("/download-report/:id", get(download_report))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn upload_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Welding Defect Detection Report Generator</title>
    <style>
        body { font-family: Arial, sans-serif; background-color: #f4f6f8;
               display: flex; justify-content: center; align-items: center;
               height: 100vh; margin: 0; }
        .container { background-color: #ffffff; padding: 40px; border-radius: 12px;
                     box-shadow: 0 4px 20px rgba(0,0,0,0.1); text-align: center;
                     width: 400px; }
        h1 { color: #333333; margin-bottom: 30px; font-size: 22px; }
        input[type="file"] { margin: 20px 0; padding: 10px; width: 100%;
                             border-radius: 6px; border: 1px solid #ccc; }
        button { background-color: #007bff; color: white; padding: 12px 20px;
                 border: none; border-radius: 6px; cursor: pointer;
                 font-size: 16px; width: 100%; }
        button:hover { background-color: #0056b3; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Welding Defect Detection Report Generator</h1>
        <form action="/upload" method="post" enctype="multipart/form-data">
            <input type="file" name="file" accept="image/jpeg" required>
            <button type="submit">Upload &amp; Generate Report</button>
        </form>
    </div>
</body>
</html>"#,
    )
}

fn success_page(download_link: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Upload Complete</title>
    <style>
        body {{ font-family: Arial, sans-serif; background-color: #f4f6f8;
                display: flex; justify-content: center; align-items: center;
                height: 100vh; margin: 0; }}
        .container {{ background-color: #ffffff; padding: 40px; border-radius: 12px;
                      box-shadow: 0 4px 20px rgba(0,0,0,0.1); text-align: center;
                      width: 400px; }}
        h2 {{ color: #333; }}
        a {{ display: inline-block; margin-top: 20px; background-color: #007bff;
             color: white; padding: 10px 20px; text-decoration: none;
             border-radius: 6px; }}
        a:hover {{ background-color: #0056b3; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>Upload Successful!</h2>
        <p>Click below to download your PDF report:</p>
        <a href="{download_link}" target="_blank">Download PDF</a>
        <br><br>
        <a href="/upload-page">Upload Another Image</a>
    </div>
</body>
</html>"#
    ))
}

async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, (StatusCode, Json<ErrorResponse>)> {
    let mut payload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        bad_request(format!("Malformed multipart upload: {}", e))
    })? {
        if field.name() == Some("file") {
            let filename = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("Failed to read upload: {}", e)))?;
            payload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, bytes)) = payload else {
        return Err(bad_request("Missing file field".to_string()));
    };
    if bytes.is_empty() {
        return Err(bad_request("Uploaded file is empty".to_string()));
    }

    // Run ids are server-generated; the client filename is metadata
    // only, so identically named concurrent uploads cannot collide.
    let run_id = Uuid::new_v4();
    let image_path = state.config.uploads_dir.join(format!("{}.jpg", run_id));
    let report_path = state.config.reports_dir.join(format!("{}.pdf", run_id));

    tokio::fs::write(&image_path, &bytes).await.map_err(|e| {
        error!("Failed to store upload {:?}: {}", image_path, e);
        internal_error()
    })?;

    info!(
        "Upload {} accepted ({} bytes, original filename {:?})",
        run_id,
        bytes.len(),
        filename
    );

    match state
        .pipeline
        .run(&image_path, &report_path, filename)
        .await
    {
        Ok(run) => {
            info!(
                "Run {} finished: {} -> {:?}",
                run_id,
                run.assessment.verdict,
                run.report.path()
            );
            Ok(success_page(&format!("/download-report/{}", run_id)))
        }
        Err(CoreError::Input(msg)) => {
            warn!("Run {} rejected: {}", run_id, msg);
            Err(bad_request(
                "Uploaded image could not be decoded".to_string(),
            ))
        }
        Err(e) => {
            error!("Run {} failed: {}", run_id, e);
            Err(internal_error())
        }
    }
}

async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    // Only server-issued UUIDs are valid report names; anything else
    // (including path tricks) is rejected outright.
    let run_id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let path = state.config.reports_dir.join(format!("{}.pdf", run_id));

    let bytes = tokio::fs::read(&path).await.map_err(|_| not_found())?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"weldcheck-{}.pdf\"", run_id),
            ),
        ],
        bytes,
    ))
}

fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message,
            code: "BAD_REQUEST".to_string(),
        }),
    )
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Inspection failed".to_string(),
            code: "INSPECTION_FAILED".to_string(),
        }),
    )
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Report not found".to_string(),
            code: "NOT_FOUND".to_string(),
        }),
    )
}
