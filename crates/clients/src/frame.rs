//! Wire codec for streaming image uploads.
//!
//! An upload body is a sequence of frames. Each frame is a one byte tag, a
//! big-endian `u32` payload length, then the payload:
//!
//! | Tag    | Payload                                   |
//! |--------|-------------------------------------------|
//! | `0x01` | JSON `{"image_type": "<subtype>"}`        |
//! | `0x02` | raw image bytes                           |

use bytes::{BufMut, Bytes, BytesMut};
use review_core::services::UploadFrame;
use serde::{Deserialize, Serialize};

/// Content type of an upload request body.
pub const UPLOAD_CONTENT_TYPE: &str = "application/vnd.review.upload-frames";

pub const TAG_INFO: u8 = 0x01;
pub const TAG_CHUNK: u8 = 0x02;

/// Tag byte plus length prefix.
const HEADER_LEN: usize = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("unknown frame tag {0:#04x}")]
    UnknownTag(u8),

    #[error("truncated frame: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("invalid info frame: {0}")]
    InvalidInfo(String),

    #[error("frame payload of {0} bytes exceeds the u32 length prefix")]
    TooLarge(usize),
}

#[derive(Serialize, Deserialize)]
struct InfoPayload {
    image_type: String,
}

/// Encode one frame into its wire representation.
pub fn encode_frame(frame: &UploadFrame) -> Result<Bytes, FrameError> {
    let (tag, payload) = match frame {
        UploadFrame::Info { image_type } => {
            let info = InfoPayload {
                image_type: image_type.clone(),
            };
            let json =
                serde_json::to_vec(&info).map_err(|e| FrameError::InvalidInfo(e.to_string()))?;
            (TAG_INFO, json)
        }
        UploadFrame::Chunk(bytes) => (TAG_CHUNK, bytes.clone()),
    };

    let len = u32::try_from(payload.len()).map_err(|_| FrameError::TooLarge(payload.len()))?;

    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u8(tag);
    buf.put_u32(len);
    buf.put_slice(&payload);
    Ok(buf.freeze())
}

/// Decode a complete upload body into its frames.
pub fn decode_frames(mut buf: &[u8]) -> Result<Vec<UploadFrame>, FrameError> {
    let mut frames = Vec::new();

    while !buf.is_empty() {
        if buf.len() < HEADER_LEN {
            return Err(FrameError::Truncated {
                needed: HEADER_LEN,
                available: buf.len(),
            });
        }
        let tag = buf[0];
        let len = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]) as usize;
        let rest = &buf[HEADER_LEN..];
        if rest.len() < len {
            return Err(FrameError::Truncated {
                needed: len,
                available: rest.len(),
            });
        }
        let (payload, tail) = rest.split_at(len);

        let frame = match tag {
            TAG_INFO => {
                let info: InfoPayload = serde_json::from_slice(payload)
                    .map_err(|e| FrameError::InvalidInfo(e.to_string()))?;
                UploadFrame::Info {
                    image_type: info.image_type,
                }
            }
            TAG_CHUNK => UploadFrame::Chunk(payload.to_vec()),
            other => return Err(FrameError::UnknownTag(other)),
        };
        frames.push(frame);
        buf = tail;
    }

    Ok(frames)
}
