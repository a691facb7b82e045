//! Conversion of propagated call metadata into outbound HTTP headers.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use review_core::context::CallMetadata;

use crate::error::ClientError;

/// Build the header map attached to every upstream call.
///
/// Every entry is forwarded unmodified; repeated keys become repeated headers.
pub fn propagated_headers(metadata: &CallMetadata) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::with_capacity(metadata.len());
    for (key, value) in metadata.iter() {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ClientError::InvalidHeader(key.to_string()))?;
        let value =
            HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(key.to_string()))?;
        headers.append(name, value);
    }
    Ok(headers)
}
