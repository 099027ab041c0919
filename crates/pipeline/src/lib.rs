pub mod hash;
pub mod pipeline;
pub mod router;
pub mod store;

pub use pipeline::{DocumentPipeline, PipelineError, ProcessedUpload, DEFAULT_EXTRACTION_TIMEOUT};
pub use router::FormatRouter;
pub use store::{ArtifactStore, RequestDir, StoreError};
