use docsift_core::Table;
use lopdf::Document;

use crate::error::PdfError;

/// Parse a PDF for either engine. Encrypted documents are opened with the
/// empty user password; anything that needs a real password is refused.
pub fn load_document(pdf: &[u8]) -> Result<Document, PdfError> {
    let mut doc = Document::load_mem(pdf)?;
    if doc.is_encrypted() && doc.decrypt("").is_err() {
        return Err(PdfError::Encrypted);
    }
    Ok(doc)
}

/// Extracts the text layer embedded in a PDF, page by page.
pub trait NativeTextEngine: Send + Sync {
    fn label(&self) -> &str;

    /// Page texts in page order, each non-empty page followed by `\n`.
    fn extract_text(&self, pdf: &[u8]) -> Result<String, PdfError>;
}

/// Text and tables recovered from page layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutExtraction {
    pub text: String,
    /// All tables across the document, by page then in detection order.
    pub tables: Vec<Table>,
}

/// Reconstructs reading order from glyph positions and detects tabular regions.
pub trait LayoutEngine: Send + Sync {
    fn label(&self) -> &str;

    fn extract(&self, pdf: &[u8]) -> Result<LayoutExtraction, PdfError>;
}
