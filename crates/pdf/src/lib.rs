pub mod analyzer;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod layout;
pub mod lines;
pub mod native;
pub mod tables;

#[cfg(test)]
pub(crate) mod fixtures;

pub use analyzer::LayoutAnalyzer;
pub use coordinator::{PdfCoordinator, NO_TEXT_PLACEHOLDER};
pub use engine::{LayoutEngine, LayoutExtraction, NativeTextEngine};
pub use error::PdfError;
pub use native::LopdfTextExtractor;
