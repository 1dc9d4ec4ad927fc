//! Error responses.

use argo_common::ArgoError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use storage::StorageError;
use tracing::error;

/// Handler error rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(pub ArgoError);

impl From<ArgoError> for ApiError {
    fn from(err: ArgoError) -> Self {
        ApiError(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError(ArgoError::DatabaseError(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            ArgoError::ProfileNotFound(_) => "not found".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
