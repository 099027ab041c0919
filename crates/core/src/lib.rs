pub mod document;
pub mod filename;
pub mod result;

pub use document::{
    allowed_extension, is_allowed_filename, DocumentError, DocumentKind, UploadedDocument,
    ALLOWED_EXTENSIONS,
};
pub use filename::{file_stem, secure_filename};
pub use result::{EngineFailure, EngineOutcome, ExtractionResult, ExtractionStatus, Table};
