//! Error types for the Argo profile services.

use thiserror::Error;

/// Result type alias using ArgoError.
pub type ArgoResult<T> = Result<T, ArgoError>;

/// Primary error type shared by the query surface.
#[derive(Debug, Error)]
pub enum ArgoError {
    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(i64),

    // === Storage Errors ===
    #[error("Database error: {0}")]
    DatabaseError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ArgoError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ArgoError::InvalidParameter { .. }
            | ArgoError::InvalidBbox(_)
            | ArgoError::InvalidTime(_) => 400,

            ArgoError::ProfileNotFound(_) => 404,

            ArgoError::ServiceUnavailable(_) => 503,

            _ => 500,
        }
    }

    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        ArgoError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ArgoError {
    fn from(err: std::io::Error) -> Self {
        ArgoError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for ArgoError {
    fn from(err: serde_json::Error) -> Self {
        ArgoError::InternalError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ArgoError::InvalidBbox("x".into()).http_status_code(), 400);
        assert_eq!(
            ArgoError::invalid_parameter("limit", "not a number").http_status_code(),
            400
        );
        assert_eq!(ArgoError::ProfileNotFound(7).http_status_code(), 404);
        assert_eq!(ArgoError::DatabaseError("down".into()).http_status_code(), 500);
        assert_eq!(
            ArgoError::ServiceUnavailable("pool".into()).http_status_code(),
            503
        );
    }
}
