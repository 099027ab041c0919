use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use docsift_core::secure_filename;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid request id: {0}")]
    InvalidRequestId(String),
    #[error("Invalid artifact name: {0}")]
    InvalidFileName(String),
    #[error("Artifact not found: {0}")]
    NotFound(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io { path: path.to_path_buf(), source }
}

/// Uploads and their artifacts, one directory per request:
/// `<root>/<request-id>/<file>`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn create_request_dir(&self, id: Uuid) -> Result<RequestDir, StoreError> {
        let path = self.root.join(id.to_string());
        tokio::fs::create_dir_all(&path).await.map_err(io_error(&path))?;
        Ok(RequestDir { id, path })
    }

    /// Path of a stored file. `request_id` must parse as a UUID and `file`
    /// must already be a sanitized name, so the result never leaves the root.
    pub fn resolve(&self, request_id: &str, file: &str) -> Result<PathBuf, StoreError> {
        let id = Uuid::parse_str(request_id)
            .map_err(|_| StoreError::InvalidRequestId(request_id.to_string()))?;
        if file.is_empty() || secure_filename(file) != file {
            return Err(StoreError::InvalidFileName(file.to_string()));
        }
        Ok(self.root.join(id.to_string()).join(file))
    }

    pub async fn read(&self, request_id: &str, file: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(request_id, file)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(format!("{request_id}/{file}")))
            }
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

/// The directory owned by a single request.
#[derive(Debug, Clone)]
pub struct RequestDir {
    id: Uuid,
    path: PathBuf,
}

impl RequestDir {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let dest = self.path.join(name);
        tokio::fs::write(&dest, bytes).await.map_err(io_error(&dest))?;
        Ok(dest)
    }
}
