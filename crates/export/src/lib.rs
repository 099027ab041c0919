pub mod bundle;
pub mod csv;
pub mod summary;

pub use bundle::{ArtifactBundle, ArtifactNames};
pub use csv::{render_tables_csv, render_text_csv, ExportError};
pub use summary::{to_pretty_json, ArtifactSummary, UploadResponse};
