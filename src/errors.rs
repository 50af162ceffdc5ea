use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Message returned when a storage-backed endpoint is hit without a configured store.
pub const NOT_CONFIGURED_MESSAGE: &str = "Database not configured";

/// Failures raised by a document store backend.
///
/// The `Display` output is the underlying message; it is passed through to
/// HTTP clients verbatim.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error reported by the database driver.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    /// The record could not be serialized into a document body.
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    /// A stored document does not have the expected shape.
    #[error("document {id} is malformed: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    /// The backend could not prepare its tables.
    #[error("{0}")]
    Unavailable(String),
}

/// Application-specific error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// No document store was configured at startup.
    #[error("{}", NOT_CONFIGURED_MESSAGE)]
    NotConfigured,
    /// The document store failed a read or write.
    #[error("{0}")]
    Storage(#[from] StorageError),
    /// The payload parsed but failed a field-level check.
    #[error("{0}")]
    Validation(String),
    /// An axum extractor rejected the request before it reached a handler.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
    /// The request did not finish within the configured timeout.
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// Error with context chain for better debugging.
    #[error("{context}: {source}")]
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable failure description.
    #[schema(example = "Database not configured")]
    pub detail: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotConfigured | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Rejected { status, .. } => *status,
            AppError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::WithContext { source, .. } => source.status(),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Storage messages are passed through unchanged; context is only logged.
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            AppError::NotConfigured => {
                tracing::error!("Storage requested but no database is configured");
                NOT_CONFIGURED_MESSAGE.to_string()
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                e.to_string()
            }
            AppError::Validation(msg) => {
                tracing::warn!("Validation failed: {}", msg);
                msg
            }
            AppError::Rejected { detail, .. } => {
                tracing::warn!("Request rejected ({}): {}", status, detail);
                detail
            }
            AppError::Timeout(secs) => {
                tracing::warn!("Request timed out after {}s", secs);
                format!("Request timed out after {}s", secs)
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.into_response();
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    /// Query deserialization failures are reported as 422, like body field errors.
    fn from(rejection: QueryRejection) -> Self {
        AppError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: rejection.body_text(),
        }
    }
}

/// Extension trait for attaching context to storage failures.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, StorageError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::Storage(e)),
            context: context.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> ErrorBody {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_configured_is_500_with_fixed_detail() {
        let response = AppError::NotConfigured.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.detail, "Database not configured");
    }

    #[tokio::test]
    async fn storage_message_is_passed_through() {
        let err = AppError::from(StorageError::Unavailable("connection refused".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await.detail, "connection refused");
    }

    #[tokio::test]
    async fn context_is_logged_not_returned() {
        let result: Result<(), StorageError> =
            Err(StorageError::Unavailable("disk full".to_string()));
        let err = result.context("writing lead").unwrap_err();
        assert_eq!(err.to_string(), "writing lead: disk full");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.into_response();
        assert_eq!(body_of(response).await.detail, "disk full");
    }

    #[test]
    fn validation_maps_to_unprocessable_entity() {
        let err = AppError::Validation("bad email".to_string());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn timeout_is_408_with_detail() {
        let response = AppError::Timeout(30).into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body_of(response).await.detail, "Request timed out after 30s");
    }
}
