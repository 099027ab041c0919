use std::sync::Arc;
use std::thread;

use docsift_core::{DocumentKind, EngineOutcome, ExtractionResult, Table};

use crate::analyzer::LayoutAnalyzer;
use crate::engine::{LayoutEngine, NativeTextEngine};
use crate::native::LopdfTextExtractor;

pub const NO_TEXT_PLACEHOLDER: &str = "No text extracted from the PDF.";

/// Runs the native-text and layout engines over the same PDF and merges them
/// into one labeled text plus the layout engine's tables. Never fails.
#[derive(Clone)]
pub struct PdfCoordinator {
    native: Arc<dyn NativeTextEngine>,
    layout: Arc<dyn LayoutEngine>,
}

impl Default for PdfCoordinator {
    fn default() -> Self {
        Self::new(Arc::new(LopdfTextExtractor::new()), Arc::new(LayoutAnalyzer::new()))
    }
}

impl PdfCoordinator {
    pub fn new(native: Arc<dyn NativeTextEngine>, layout: Arc<dyn LayoutEngine>) -> Self {
        Self { native, layout }
    }

    pub fn extract(&self, pdf: &[u8]) -> ExtractionResult {
        // The engines read the same immutable bytes and share nothing else.
        let (native, layout) = thread::scope(|s| {
            let native = s.spawn(|| self.native.extract_text(pdf));
            let layout = s.spawn(|| self.layout.extract(pdf));
            (native.join(), layout.join())
        });

        let native_label = self.native.label();
        let native_outcome = match native {
            Ok(Ok(text)) => EngineOutcome::Extracted(text),
            Ok(Err(e)) => EngineOutcome::Failed(format!("Error extracting text with {native_label}: {e}")),
            Err(_) => EngineOutcome::Failed(format!("Error extracting text with {native_label}: engine panicked")),
        };

        let layout_label = self.layout.label();
        let (layout_outcome, tables): (EngineOutcome, Vec<Table>) = match layout {
            Ok(Ok(out)) => (EngineOutcome::Extracted(out.text), out.tables),
            Ok(Err(e)) => (
                EngineOutcome::Failed(format!(
                    "Error extracting text and tables with {layout_label}: {e}"
                )),
                Vec::new(),
            ),
            Err(_) => (
                EngineOutcome::Failed(format!(
                    "Error extracting text and tables with {layout_label}: engine panicked"
                )),
                Vec::new(),
            ),
        };

        for (label, outcome) in [(native_label, &native_outcome), (layout_label, &layout_outcome)] {
            if let Some(reason) = outcome.failure_reason() {
                tracing::warn!(engine = label, "PDF engine failed: {reason}");
            }
        }

        let text = combine_sections(native_label, &native_outcome, layout_label, &layout_outcome);
        ExtractionResult::assemble(
            DocumentKind::Pdf,
            text,
            tables,
            &[(native_label, &native_outcome), (layout_label, &layout_outcome)],
        )
    }
}

/// `--- A ---\n<a>\n\n--- B ---\n<b>` with each section trimmed, or the
/// placeholder when both engines came back empty.
pub fn combine_sections(
    first_label: &str,
    first: &EngineOutcome,
    second_label: &str,
    second: &EngineOutcome,
) -> String {
    let first_text = first.as_text().trim();
    let second_text = second.as_text().trim();
    if first_text.is_empty() && second_text.is_empty() {
        return NO_TEXT_PLACEHOLDER.to_string();
    }
    format!("--- {first_label} ---\n{first_text}\n\n--- {second_label} ---\n{second_text}")
}
