use std::sync::Arc;

use docsift_core::{DocumentKind, ExtractionResult, UploadedDocument};
use docsift_ocr::{ImageTextEngine, OcrBackend};
use docsift_pdf::PdfCoordinator;

/// Sends each document to the extractor for its kind.
#[derive(Clone)]
pub struct FormatRouter {
    image: ImageTextEngine,
    pdf: PdfCoordinator,
}

impl FormatRouter {
    pub fn new(image: ImageTextEngine, pdf: PdfCoordinator) -> Self {
        Self { image, pdf }
    }

    /// OCR through `backend`, PDFs through the default lopdf engines.
    pub fn with_backend(backend: Arc<dyn OcrBackend>) -> Self {
        Self::new(ImageTextEngine::new(backend), PdfCoordinator::default())
    }

    pub fn engine_label(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Image => self.image.label(),
            DocumentKind::Pdf => "pdf",
        }
    }

    pub fn extract(&self, doc: &UploadedDocument) -> ExtractionResult {
        match doc.kind() {
            DocumentKind::Image => {
                let outcome = self.image.recognize_bytes(doc.bytes());
                ExtractionResult::from_image(self.image.label(), &outcome)
            }
            DocumentKind::Pdf => self.pdf.extract(doc.bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_core::{ExtractionStatus, Table};
    use docsift_ocr::MockRecognizer;
    use docsift_pdf::{LayoutEngine, LayoutExtraction, NativeTextEngine, PdfError};
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

    fn router() -> FormatRouter {
        FormatRouter::new(
            ImageTextEngine::new(Arc::new(MockRecognizer::new("scanned text"))),
            PdfCoordinator::new(Arc::new(FixedNative), Arc::new(FixedLayout)),
        )
    }

    #[test]
    fn images_go_to_ocr() {
        let doc = UploadedDocument::new("Scan.JPG", tiny_png()).unwrap();
        let result = router().extract(&doc);
        assert_eq!(result.kind, DocumentKind::Image);
        assert_eq!(result.text, "scanned text");
        assert!(result.tables.is_empty());
        assert_eq!(result.status, ExtractionStatus::Success);
    }

    #[test]
    fn pdfs_go_to_the_coordinator() {
        let doc = UploadedDocument::new("report.pdf", b"%PDF-1.4".to_vec()).unwrap();
        let result = router().extract(&doc);
        assert_eq!(result.kind, DocumentKind::Pdf);
        assert_eq!(result.text, "--- Engine B ---\nPage1\n\n--- Engine C ---\nPage1 text");
        assert_eq!(result.tables.len(), 1);
    }

    #[test]
    fn undecodable_image_is_a_failed_result() {
        let doc = UploadedDocument::new("broken.png", b"not an image".to_vec()).unwrap();
        let result = router().extract(&doc);
        assert_eq!(result.status, ExtractionStatus::Failed);
        assert_eq!(
            result.text,
            "Error: The file could not be opened. It may be an unsupported format."
        );
    }
}
