use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use docsift_core::{ExtractionResult, UploadedDocument};
use docsift_export::{ArtifactBundle, ArtifactNames, ExportError};
use thiserror::Error;
use uuid::Uuid;

use crate::hash;
use crate::router::FormatRouter;
use crate::store::{ArtifactStore, StoreError};

pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Artifact storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("Artifact rendering failed: {0}")]
    Export(#[from] ExportError),
}

/// Everything produced for one upload.
#[derive(Debug)]
pub struct ProcessedUpload {
    pub request_id: Uuid,
    /// SHA-256 hex digest of the uploaded bytes.
    pub digest: String,
    /// Where the upload itself was stored.
    pub upload_path: PathBuf,
    pub result: ExtractionResult,
    pub bundle: ArtifactBundle,
}

/// Orchestrates: store upload → extract (off the async runtime, bounded by a
/// timeout) → render artifacts → store artifacts.
pub struct DocumentPipeline {
    router: Arc<FormatRouter>,
    store: ArtifactStore,
    timeout: Duration,
}

impl DocumentPipeline {
    pub fn new(router: FormatRouter, store: ArtifactStore) -> Self {
        Self { router: Arc::new(router), store, timeout: DEFAULT_EXTRACTION_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub async fn process(&self, doc: UploadedDocument) -> Result<ProcessedUpload, PipelineError> {
        let request_id = Uuid::new_v4();
        let digest = hash::upload_digest(doc.bytes());
        let kind = doc.kind();
        let filename = doc.filename().to_string();
        let stem = doc.stem().to_string();

        let dir = self.store.create_request_dir(request_id).await?;
        let upload_path = dir.write(&filename, doc.bytes()).await?;

        let result = self.extract(doc).await;

        let names = ArtifactNames::for_upload(kind, &stem).in_dir(request_id.to_string());
        let bundle = ArtifactBundle::build(&result, names)?;
        dir.write(&bundle.names.csv, &bundle.csv).await?;
        dir.write(&bundle.names.json, &bundle.summary_json).await?;

        tracing::info!(
            request_id = %request_id,
            kind = %kind,
            filename = %filename,
            digest = %digest,
            status = %result.status,
            tables = result.tables.len(),
            "processed upload"
        );

        Ok(ProcessedUpload { request_id, digest, upload_path, result, bundle })
    }

    /// Runs the router on the blocking pool. A timeout or a crashed task
    /// still yields a result; the blocking work is not cancelled.
    async fn extract(&self, doc: UploadedDocument) -> ExtractionResult {
        let kind = doc.kind();
        let router = Arc::clone(&self.router);
        let task = tokio::task::spawn_blocking(move || router.extract(&doc));

        let label = self.router.engine_label(kind).to_string();
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::error!(kind = %kind, "extraction task failed: {e}");
                ExtractionResult::failed(kind, &label, format!("An unexpected error occurred: {e}"))
            }
            Err(_) => {
                let seconds = format_seconds(self.timeout);
                tracing::warn!(kind = %kind, timeout_secs = %seconds, "extraction timed out");
                ExtractionResult::failed(
                    kind,
                    &label,
                    format!("Error: extraction timed out after {seconds} seconds."),
                )
            }
        }
    }
}

/// Whole seconds when exact, otherwise fractional (`0.25`).
fn format_seconds(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        duration.as_secs_f64().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_core::{DocumentKind, ExtractionStatus, Table};
    use docsift_ocr::{ImageTextEngine, MockRecognizer, OcrBackend, OcrError};
    use docsift_pdf::{LayoutEngine, LayoutExtraction, NativeTextEngine, PdfCoordinator, PdfError};
    use image::{DynamicImage, ImageBuffer, Luma};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png).unwrap();
        buf
    }

    struct FixedNative;

    impl NativeTextEngine for FixedNative {
        fn label(&self) -> &str {
            "Engine B"
        }

        fn extract_text(&self, _pdf: &[u8]) -> Result<String, PdfError> {
            Ok("Page1\n".into())
        }
    }

    struct FixedLayout;

    impl LayoutEngine for FixedLayout {
        fn label(&self) -> &str {
            "Engine C"
        }

        fn extract(&self, _pdf: &[u8]) -> Result<LayoutExtraction, PdfError> {
            Ok(LayoutExtraction {
                text: "Page1 text\n".into(),
                tables: vec![Table::from_rows([["a", "b"], ["c", "d"]])],
            })
        }
    }

    struct SlowRecognizer;

    impl OcrBackend for SlowRecognizer {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok("too late".into())
        }
    }

    fn pipeline(backend: impl OcrBackend + 'static, root: &std::path::Path) -> DocumentPipeline {
        let router = FormatRouter::new(
            ImageTextEngine::new(Arc::new(backend)),
            PdfCoordinator::new(Arc::new(FixedNative), Arc::new(FixedLayout)),
        );
        DocumentPipeline::new(router, ArtifactStore::new(root))
    }

    #[tokio::test]
    async fn image_upload_writes_upload_csv_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(MockRecognizer::new("Hello, receipt"), dir.path());

        let doc = UploadedDocument::new("scan.png", tiny_png()).unwrap();
        let out = p.process(doc).await.unwrap();

        let request_dir = dir.path().join(out.request_id.to_string());
        assert_eq!(out.upload_path, request_dir.join("scan.png"));
        assert!(out.upload_path.exists());
        assert_eq!(out.digest.len(), 64);

        let csv = std::fs::read_to_string(request_dir.join("scan.csv")).unwrap();
        assert_eq!(csv, "text\n\"Hello, receipt\"\n");

        let summary: serde_json::Value =
            serde_json::from_slice(&std::fs::read(request_dir.join("scan_output.json")).unwrap())
                .unwrap();
        assert_eq!(summary["text"], "Hello, receipt");
        assert_eq!(summary["csv"], format!("{}/scan.csv", out.request_id));

        assert_eq!(out.bundle.response.text, "Hello, receipt");
        assert_eq!(out.bundle.response.json, format!("{}/scan_output.json", out.request_id));
    }

    #[tokio::test]
    async fn pdf_upload_writes_tables_csv() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(MockRecognizer::new("unused"), dir.path());

        let doc = UploadedDocument::new("report.pdf", b"%PDF-1.4".to_vec()).unwrap();
        let out = p.process(doc).await.unwrap();

        assert_eq!(out.result.kind, DocumentKind::Pdf);
        assert_eq!(out.result.text, "--- Engine B ---\nPage1\n\n--- Engine C ---\nPage1 text");
        let csv_path = dir.path().join(out.request_id.to_string()).join("report_tables.csv");
        assert_eq!(std::fs::read(csv_path).unwrap(), b"a,b\nc,d\n\n");
        assert_eq!(out.bundle.response.csv, format!("{}/report_tables.csv", out.request_id));
    }

    #[tokio::test]
    async fn repeated_uploads_get_distinct_directories() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(MockRecognizer::new("same"), dir.path());

        let first = p.process(UploadedDocument::new("scan.png", tiny_png()).unwrap()).await.unwrap();
        let second = p.process(UploadedDocument::new("scan.png", tiny_png()).unwrap()).await.unwrap();

        assert_ne!(first.request_id, second.request_id);
        assert_eq!(first.digest, second.digest);
        assert!(first.upload_path.exists() && second.upload_path.exists());
    }

    #[tokio::test]
    async fn slow_extraction_times_out_into_a_failed_result() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(SlowRecognizer, dir.path()).with_timeout(Duration::from_millis(20));

        let out = p.process(UploadedDocument::new("scan.png", tiny_png()).unwrap()).await.unwrap();
        assert_eq!(out.result.status, ExtractionStatus::Failed);
        assert_eq!(out.result.text, "Error: extraction timed out after 0.02 seconds.");
        let csv_path = dir.path().join(out.request_id.to_string()).join("scan.csv");
        assert!(csv_path.exists());
    }

    #[test]
    fn timeout_seconds_keep_their_fraction() {
        assert_eq!(format_seconds(Duration::from_secs(120)), "120");
        assert_eq!(format_seconds(Duration::from_millis(250)), "0.25");
        assert_eq!(format_seconds(Duration::from_millis(1500)), "1.5");
    }

    #[tokio::test]
    async fn unwritable_root_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let p = pipeline(MockRecognizer::new("x"), &blocker);

        let err = p.process(UploadedDocument::new("scan.png", tiny_png()).unwrap()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Store(StoreError::Io { .. })));
    }
}
