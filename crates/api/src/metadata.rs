//! Capture of inbound headers as propagated call metadata.

use axum::http::HeaderMap;
use review_core::context::CallMetadata;

use crate::error::AppError;

/// Copy the allowlisted inbound headers into a [`CallMetadata`] bag.
///
/// Values are kept byte-for-byte; headers absent from the request are simply
/// not recorded. A value that is not visible ASCII is rejected.
pub fn inbound_metadata(headers: &HeaderMap, allowlist: &[String]) -> Result<CallMetadata, AppError> {
    let mut metadata = CallMetadata::new();
    for name in allowlist {
        for value in headers.get_all(name.as_str()) {
            let value = value
                .to_str()
                .map_err(|_| AppError::BadRequest(format!("Header `{name}` is not valid text")))?;
            metadata.insert(name, value);
        }
    }
    Ok(metadata)
}
