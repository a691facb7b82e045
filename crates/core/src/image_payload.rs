//! Parsing of encoded image payloads.
//!
//! Clients attach images as data URLs of the form
//! `data:image/<subtype>;<params>,<base64 data>`. Parsing and decoding happen
//! before any upload is opened, so a bad payload never costs a remote call.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;

use crate::error::ImageRelayError;

/// Default ceiling on the decoded size of one image (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Regex pattern splitting a data URL into its image subtype and data segment.
pub const DATA_URL_PATTERN: &str = r"(?s)^data:image/([A-Za-z0-9.+-]+);[^,]*,(.*)$";

static DATA_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATA_URL_PATTERN).expect("valid regex"));

/// A data URL split into its parts, not yet decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedImage<'a> {
    /// Image subtype from the prefix, e.g. `png`.
    pub image_type: &'a str,
    /// The base64 segment after the comma.
    pub data: &'a str,
}

/// A decoded image ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub image_type: String,
    pub bytes: Vec<u8>,
}

/// Split a data URL into subtype and data segment.
pub fn parse_encoded_image(payload: &str) -> Result<EncodedImage<'_>, ImageRelayError> {
    let captures = DATA_URL_RE.captures(payload.trim_start()).ok_or_else(|| {
        ImageRelayError::MalformedImagePayload(
            "expected `data:image/<type>;...,<data>`".to_string(),
        )
    })?;

    // Both groups are mandatory in the pattern.
    let (Some(image_type), Some(data)) = (captures.get(1), captures.get(2)) else {
        return Err(ImageRelayError::MalformedImagePayload(
            "missing image type or data segment".to_string(),
        ));
    };

    Ok(EncodedImage {
        image_type: image_type.as_str(),
        data: data.as_str(),
    })
}

/// Parse and base64-decode a data URL, enforcing `max_bytes` on the result.
pub fn decode_image(payload: &str, max_bytes: usize) -> Result<DecodedImage, ImageRelayError> {
    let encoded = parse_encoded_image(payload)?;

    let bytes = STANDARD
        .decode(encoded.data.trim())
        .map_err(|e| ImageRelayError::ImageDecodeFailed(e.to_string()))?;

    if bytes.is_empty() {
        return Err(ImageRelayError::ImageDecodeFailed(
            "image data is empty".to_string(),
        ));
    }
    if bytes.len() > max_bytes {
        return Err(ImageRelayError::ImageTooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }

    Ok(DecodedImage {
        image_type: encoded.image_type.to_string(),
        bytes,
    })
}
