/// Domain-level errors raised by validation helpers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Terminal failures of a review submission.
///
/// Every variant aborts the submission before any image is relayed. None of
/// them is retried at this layer.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The inbound call carried no credential metadata to propagate.
    #[error("Request carries no authentication context")]
    AuthenticationContextMissing,

    /// The order service could not be asked whether the product was bought.
    #[error("Order verification failed: {0}")]
    OrderVerificationFailed(RemoteError),

    /// The order service answered that the caller never bought the product.
    #[error("Product not purchased by caller")]
    PurchaseNotVerified,

    /// The identity service call failed or returned an unusable identifier.
    #[error("Identity resolution failed: {0}")]
    IdentityResolutionFailed(String),

    /// The review row could not be written.
    #[error("Persistence failed: {0}")]
    PersistenceFailed(StoreError),

    /// The call was cancelled while a gating step was in flight.
    #[error("Review submission was cancelled")]
    Cancelled,
}

/// Failure to relay or store one attached image.
///
/// These never fail a submission: the image is logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum ImageRelayError {
    /// The payload is not a `data:image/<type>;...,<data>` string.
    #[error("Malformed image payload: {0}")]
    MalformedImagePayload(String),

    /// The base64 segment could not be decoded.
    #[error("Image decode failed: {0}")]
    ImageDecodeFailed(String),

    /// The decoded image exceeds the configured size limit.
    #[error("Image of {size} bytes exceeds the {max} byte limit")]
    ImageTooLarge { size: usize, max: usize },

    /// The image service rejected or dropped the upload.
    #[error("Image upload failed: {0}")]
    Upload(RemoteError),

    /// The image was stored remotely but its reference could not be saved.
    #[error("Image reference persistence failed: {0}")]
    Persistence(StoreError),

    /// The call was cancelled while this image was in flight.
    #[error("Image relay was cancelled")]
    Cancelled,
}

/// Failure of a call to one of the remote collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status.
    #[error("remote service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The remote service answered with a body we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Failure reported by the review storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("storage error: {0}")]
pub struct StoreError(pub String);
