use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rollcall_core::error::CoreError;
use rollcall_db::StoreError;
use rollcall_pipeline::PipelineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the error types of the domain crates and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `rollcall_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed image or video job.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A malformed or unreadable JSON request body.
    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string())
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => internal("Internal core error", msg),
            },

            // --- Pipeline errors ---
            AppError::Pipeline(err) => classify_pipeline_error(err),

            // --- Store errors ---
            AppError::Store(err) => internal("Store error", &err.to_string()),

            // --- HTTP-specific errors ---
            AppError::JsonBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                rejection.body_text(),
            ),
            AppError::InternalError(msg) => internal("Internal error", msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Log the real cause and return a sanitized 500.
fn internal(context: &'static str, detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "{context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a pipeline error into an HTTP status, error code, and message.
///
/// - A decoder failure maps to 500 but keeps its message, so callers can tell
///   an unreadable upload from other server faults.
/// - A failing detection service maps to 502.
/// - A cancelled job maps to 503.
/// - Encoder, annotator and I/O failures map to 500 with a sanitized message.
fn classify_pipeline_error(err: &PipelineError) -> (StatusCode, &'static str, String) {
    match err {
        PipelineError::Decode(_) => {
            tracing::warn!(error = %err, "Media could not be decoded");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DECODE_ERROR",
                err.to_string(),
            )
        }
        PipelineError::Detection { .. } => {
            tracing::warn!(error = %err, "Detection failed");
            (
                StatusCode::BAD_GATEWAY,
                "DETECTION_ERROR",
                "The detection service failed".to_string(),
            )
        }
        PipelineError::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            "CANCELLED",
            err.to_string(),
        ),
        PipelineError::Annotate { .. } | PipelineError::Encode(_) | PipelineError::Io(_) => {
            internal("Media pipeline error", &err.to_string())
        }
    }
}
