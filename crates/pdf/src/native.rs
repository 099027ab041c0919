use crate::engine::{load_document, NativeTextEngine};
use crate::error::PdfError;

/// Reads the embedded text layer with `lopdf`'s own text extraction,
/// which honours font encodings.
#[derive(Debug, Default, Clone)]
pub struct LopdfTextExtractor;

impl LopdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl NativeTextEngine for LopdfTextExtractor {
    fn label(&self) -> &str {
        "Native Text Extraction"
    }

    fn extract_text(&self, pdf: &[u8]) -> Result<String, PdfError> {
        let doc = load_document(pdf)?;

        let mut text = String::new();
        for page_number in doc.get_pages().into_keys() {
            let page_text = doc.extract_text(&[page_number])?;
            if !page_text.is_empty() {
                text.push_str(&page_text);
                text.push('\n');
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{encrypt_with_password, pdf_with_pages, text_at};

    #[test]
    fn extracts_pages_in_order() {
        let pdf = pdf_with_pages(vec![
            text_at(72, 700, 12, "First page"),
            text_at(72, 700, 12, "Second page"),
        ]);
        let text = LopdfTextExtractor::new().extract_text(&pdf).unwrap();
        let first = text.find("First page").expect("first page text");
        let second = text.find("Second page").expect("second page text");
        assert!(first < second);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn corrupt_input_is_an_error() {
        assert!(LopdfTextExtractor::new().extract_text(b"not a pdf").is_err());
    }

    #[test]
    fn opens_documents_encrypted_with_an_empty_user_password() {
        let pdf = encrypt_with_password(&pdf_with_pages(vec![text_at(72, 700, 12, "Sealed text")]), b"");
        let text = LopdfTextExtractor::new().extract_text(&pdf).unwrap();
        assert!(text.contains("Sealed text"));
    }

    #[test]
    fn refuses_documents_that_need_a_password() {
        let pdf = encrypt_with_password(&pdf_with_pages(vec![text_at(72, 700, 12, "Sealed text")]), b"hunter2");
        let err = LopdfTextExtractor::new().extract_text(&pdf).unwrap_err();
        assert!(matches!(err, PdfError::Encrypted));
    }
}
