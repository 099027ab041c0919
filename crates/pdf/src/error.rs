use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("page {page}: {detail}")]
    Page { page: u32, detail: String },
}
