use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::csv::ExportError;

/// The JSON artifact written next to the CSV: the extracted text and where
/// its CSV lives. Exactly these two keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub text: String,
    pub csv: String,
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub text: String,
    pub csv: String,
    pub json: String,
}

/// Four-space indented JSON. Non-ASCII is written as UTF-8, not escaped.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(buf)
}
