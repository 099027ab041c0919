use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderName;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use docsift_core::UploadedDocument;
use docsift_pipeline::DocumentPipeline;
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

/// Carries the typed outcome without changing the response body.
pub const EXTRACTION_STATUS_HEADER: HeaderName = HeaderName::from_static("x-extraction-status");

const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DocumentPipeline>,
}

impl AppState {
    pub fn new(pipeline: DocumentPipeline) -> Self {
        Self { pipeline: Arc::new(pipeline) }
    }
}

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/artifacts/{request_id}/{file}", get(download_artifact))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /upload
///
/// Takes the multipart field `file`, runs extraction and answers with the
/// text plus references to the stored CSV and JSON artifacts.
async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        upload = Some((filename, data));
        break;
    }
    let (filename, data) = upload.ok_or(ApiError::NoFilePart)?;

    let doc = UploadedDocument::new(&filename, data.to_vec())?;
    let processed = state.pipeline.process(doc).await?;

    let status = processed.result.status.as_str();
    Ok(([(EXTRACTION_STATUS_HEADER, status)], Json(processed.bundle.response)).into_response())
}

/// GET /artifacts/{request_id}/{file}
async fn download_artifact(
    State(state): State<AppState>,
    Path((request_id, file)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let bytes = state.pipeline.store().read(&request_id, &file).await?;
    let disposition = format!("attachment; filename=\"{file}\"");
    Ok((
        [(CONTENT_TYPE, content_type_for(&file).to_string()), (CONTENT_DISPOSITION, disposition)],
        bytes,
    )
        .into_response())
}

fn content_type_for(file: &str) -> &'static str {
    let ext = file.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => "text/csv; charset=utf-8",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg" | "jfif") => "image/jpeg",
        Some("tiff") => "image/tiff",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
