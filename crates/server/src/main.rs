use std::sync::Arc;

use anyhow::Context;
use docsift_ocr::OcrBackend;
use docsift_pipeline::{ArtifactStore, DocumentPipeline, FormatRouter};
use docsift_server::{build_router, telemetry, AppState, OcrConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    telemetry::init(config.log_format);

    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.uploads_dir.display()))?;

    let backend = ocr_backend(&config.ocr);
    tracing::info!(backend = backend.name(), "OCR backend ready");

    let pipeline = DocumentPipeline::new(
        FormatRouter::with_backend(backend),
        ArtifactStore::new(&config.uploads_dir),
    )
    .with_timeout(config.extraction_timeout());
    let app = build_router(AppState::new(pipeline), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(
        bind = %config.bind,
        uploads_dir = %config.uploads_dir.display(),
        "docsift listening"
    );
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

#[cfg(feature = "tesseract")]
fn ocr_backend(ocr: &OcrConfig) -> Arc<dyn OcrBackend> {
    Arc::new(docsift_ocr::TesseractRecognizer::new(ocr.data_path.clone(), &ocr.lang))
}

#[cfg(not(feature = "tesseract"))]
fn ocr_backend(_ocr: &OcrConfig) -> Arc<dyn OcrBackend> {
    tracing::warn!("built without the `tesseract` feature; image uploads will report OCR as unavailable");
    Arc::new(docsift_ocr::UnavailableRecognizer)
}
