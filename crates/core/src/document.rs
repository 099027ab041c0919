use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::filename::{file_stem, secure_filename};

/// Extensions accepted at the upload boundary. Matched case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "jfif", "webp", "bmp", "pdf"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("No selected file")]
    EmptyFilename,
    #[error("Invalid file type")]
    InvalidType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Image,
    Pdf,
}

impl DocumentKind {
    /// Routing decision from the filename suffix alone.
    /// Returns `None` when the extension is missing or not permitted.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = allowed_extension(filename)?;
        Some(Self::from_extension(&ext))
    }

    fn from_extension(ext: &str) -> Self {
        if ext == "pdf" {
            DocumentKind::Pdf
        } else {
            DocumentKind::Image
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Image => write!(f, "image"),
            DocumentKind::Pdf => write!(f, "pdf"),
        }
    }
}

/// Lowercased extension after the last `.`, if it is in [`ALLOWED_EXTENSIONS`].
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

pub fn is_allowed_filename(filename: &str) -> bool {
    allowed_extension(filename).is_some()
}

/// An uploaded file, validated and renamed to a filesystem-safe name.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    filename: String,
    extension: String,
    kind: DocumentKind,
    bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(original_filename: &str, bytes: Vec<u8>) -> Result<Self, DocumentError> {
        if original_filename.is_empty() {
            return Err(DocumentError::EmptyFilename);
        }
        let extension = allowed_extension(original_filename).ok_or(DocumentError::InvalidType)?;
        let kind = DocumentKind::from_extension(&extension);

        // Sanitizing can eat the extension (e.g. a name made only of non-ASCII
        // characters); the routing decision was already made on the raw name.
        let mut filename = secure_filename(original_filename);
        if allowed_extension(&filename).as_deref() != Some(extension.as_str()) {
            filename = format!("upload.{extension}");
        }

        Ok(Self { filename, extension, kind, bytes })
    }

    /// Sanitized filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Sanitized filename without its extension.
    pub fn stem(&self) -> &str {
        file_stem(&self.filename)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
