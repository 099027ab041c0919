use docsift_core::Table;
use lopdf::content::Content;
use lopdf::{Document, ObjectId};

use crate::engine::{load_document, LayoutEngine, LayoutExtraction};
use crate::error::PdfError;
use crate::layout::{collect_runs, FontEncodings};
use crate::lines::{build_lines, Line};
use crate::tables::detect_tables;

/// Lines and tables recovered from one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub number: u32,
    pub lines: Vec<Line>,
    pub tables: Vec<Table>,
}

impl PageLayout {
    pub fn text(&self) -> String {
        self.lines.iter().map(Line::text).collect::<Vec<_>>().join("\n")
    }
}

/// Layout-aware extractor built on `lopdf` content-stream decoding.
#[derive(Debug, Default, Clone)]
pub struct LayoutAnalyzer;

impl LayoutAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_page(
        &self,
        doc: &Document,
        number: u32,
        page_id: ObjectId,
    ) -> Result<PageLayout, PdfError> {
        let page_err = |e: lopdf::Error| PdfError::Page { page: number, detail: e.to_string() };
        let raw = doc.get_page_content(page_id).map_err(page_err)?;
        let content = Content::decode(&raw).map_err(page_err)?;

        let encodings: FontEncodings = doc
            .get_page_fonts(page_id)
            .into_iter()
            .map(|(name, font)| (name, font.get_font_encoding()))
            .collect();

        let lines = build_lines(collect_runs(&content.operations, &encodings));
        let tables = detect_tables(&lines);
        Ok(PageLayout { number, lines, tables })
    }

    /// Every page in page order. Pages that cannot be decoded are skipped.
    pub fn analyze(&self, pdf: &[u8]) -> Result<Vec<PageLayout>, PdfError> {
        let doc = load_document(pdf)?;

        let mut pages = Vec::new();
        for (number, page_id) in doc.get_pages() {
            match self.analyze_page(&doc, number, page_id) {
                Ok(page) => pages.push(page),
                Err(e) => tracing::warn!(page = number, "skipping page in layout analysis: {e}"),
            }
        }
        Ok(pages)
    }
}

impl LayoutEngine for LayoutAnalyzer {
    fn label(&self) -> &str {
        "Layout Analysis Extraction"
    }

    fn extract(&self, pdf: &[u8]) -> Result<LayoutExtraction, PdfError> {
        let mut out = LayoutExtraction::default();
        for page in self.analyze(pdf)? {
            let text = page.text();
            if !text.is_empty() {
                out.text.push_str(&text);
                out.text.push('\n');
            }
            out.tables.extend(page.tables);
        }
        Ok(out)
    }
}
