use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use docsift_core::EngineOutcome;
use thiserror::Error;

use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};

/// Failure categories surfaced to the caller in place of text.
#[derive(Debug, Error)]
pub enum OcrFailure {
    #[error("Error: The file was not found.")]
    NotFound,
    #[error("Error: The file could not be opened. It may be an unsupported format.")]
    UnreadableFormat,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<PreprocessError> for OcrFailure {
    fn from(e: PreprocessError) -> Self {
        match e {
            PreprocessError::Read(io) if io.kind() == ErrorKind::NotFound => OcrFailure::NotFound,
            PreprocessError::Read(io) => OcrFailure::Unexpected(io.to_string()),
            PreprocessError::Decode(_) => OcrFailure::UnreadableFormat,
            PreprocessError::Encode(msg) => OcrFailure::Unexpected(msg),
        }
    }
}

impl From<OcrError> for OcrFailure {
    fn from(e: OcrError) -> Self {
        match e {
            OcrError::ImageDecode(_) => OcrFailure::UnreadableFormat,
            other => OcrFailure::Unexpected(other.to_string()),
        }
    }
}

/// Image-to-text adapter: preprocess, then hand the normalized PNG to the
/// configured backend. Never returns an error; faults become
/// [`EngineOutcome::Failed`].
#[derive(Clone)]
pub struct ImageTextEngine {
    backend: Arc<dyn OcrBackend>,
}

impl ImageTextEngine {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self { backend }
    }

    pub fn label(&self) -> &str {
        self.backend.name()
    }

    pub fn recognize_bytes(&self, data: &[u8]) -> EngineOutcome {
        self.recognize_prepared(preprocess::prepare_for_ocr_from_bytes(data))
    }

    pub fn recognize_file(&self, path: &Path) -> EngineOutcome {
        self.recognize_prepared(preprocess::prepare_for_ocr(path))
    }

    fn recognize_prepared(&self, prepared: Result<Vec<u8>, PreprocessError>) -> EngineOutcome {
        let result = prepared
            .map_err(OcrFailure::from)
            .and_then(|png| Ok(self.backend.recognize(&png)?));
        self.outcome(result)
    }

    fn outcome(&self, result: Result<String, OcrFailure>) -> EngineOutcome {
        match result {
            Ok(text) => EngineOutcome::Extracted(text),
            Err(failure) => {
                tracing::warn!(engine = self.label(), "OCR failed: {failure}");
                EngineOutcome::Failed(failure.to_string())
            }
        }
    }
}
