use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use review_core::error::{CoreError, SubmissionError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for validation errors, [`SubmissionError`] for the
/// review write path, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A validation error from `review_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A terminal failure of a review submission.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// An unexpected server-side failure. The message is logged, never
    /// returned to the caller.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            AppError::Submission(err) => classify_submission_error(err),

            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error()
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a submission failure into an HTTP status, error code, and message.
///
/// Upstream failures map to 502; persistence failures are logged and
/// sanitized.
fn classify_submission_error(err: &SubmissionError) -> (StatusCode, &'static str, String) {
    match err {
        SubmissionError::AuthenticationContextMissing => {
            (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", err.to_string())
        }
        SubmissionError::PurchaseNotVerified => {
            (StatusCode::FORBIDDEN, "PURCHASE_NOT_VERIFIED", err.to_string())
        }
        SubmissionError::OrderVerificationFailed(_) => (
            StatusCode::BAD_GATEWAY,
            "ORDER_VERIFICATION_FAILED",
            err.to_string(),
        ),
        SubmissionError::IdentityResolutionFailed(_) => (
            StatusCode::BAD_GATEWAY,
            "IDENTITY_RESOLUTION_FAILED",
            err.to_string(),
        ),
        SubmissionError::PersistenceFailed(store_err) => {
            tracing::error!(error = %store_err, "Review persistence failed");
            internal_error()
        }
        SubmissionError::Cancelled => {
            (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED", err.to_string())
        }
    }
}
