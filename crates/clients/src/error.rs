use review_core::error::RemoteError;

use crate::frame::FrameError;

/// Errors from the upstream HTTP client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream returned a non-2xx status code.
    #[error("Upstream API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A propagated metadata entry is not a valid HTTP header.
    #[error("Metadata entry `{0}` cannot be sent as an HTTP header")]
    InvalidHeader(String),

    #[error("Upload frame error: {0}")]
    Frame(#[from] FrameError),

    /// The upload request ended before all frames were sent.
    #[error("Upload stream closed before completion")]
    StreamClosed,
}

impl From<ClientError> for RemoteError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status, body } => RemoteError::Status { status, body },
            ClientError::Request(e) if e.is_decode() => RemoteError::InvalidResponse(e.to_string()),
            other => RemoteError::Transport(other.to_string()),
        }
    }
}
