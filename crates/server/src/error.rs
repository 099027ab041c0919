use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docsift_core::DocumentError;
use docsift_pipeline::{PipelineError, StoreError};
use serde_json::json;
use thiserror::Error;

/// Request failures, rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file part")]
    NoFilePart,
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Malformed multipart body")]
    MalformedMultipart,
    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,
    #[error("Failed to store artifacts")]
    Pipeline(#[from] PipelineError),
    #[error("Invalid artifact reference")]
    InvalidArtifact,
    #[error("Artifact not found")]
    ArtifactNotFound,
    #[error("Failed to read artifact")]
    ArtifactRead(StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFilePart
            | ApiError::Document(_)
            | ApiError::MalformedMultipart
            | ApiError::InvalidArtifact => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ArtifactNotFound => StatusCode::NOT_FOUND,
            ApiError::Pipeline(_) | ApiError::ArtifactRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            tracing::debug!("rejecting multipart body: {e}");
            ApiError::MalformedMultipart
        }
    }
}

/// A request that is not `multipart/form-data` at all carries no file part.
impl From<MultipartRejection> for ApiError {
    fn from(e: MultipartRejection) -> Self {
        tracing::debug!("rejecting upload request: {e}");
        ApiError::NoFilePart
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidRequestId(_) | StoreError::InvalidFileName(_) => ApiError::InvalidArtifact,
            StoreError::NotFound(_) => ApiError::ArtifactNotFound,
            other => ApiError::ArtifactRead(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Pipeline(e) => tracing::error!("upload processing failed: {e}"),
            ApiError::ArtifactRead(e) => tracing::error!("artifact read failed: {e}"),
            _ => {}
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
