//! Relays one encoded image to the image service.
//!
//! A relay decodes the payload locally, opens a streaming upload, sends the
//! info frame followed by a single data frame, then closes the stream and
//! returns the URL the image service assigned.

use crate::context::CallContext;
use crate::error::ImageRelayError;
use crate::image_payload::{decode_image, DecodedImage, DEFAULT_MAX_IMAGE_BYTES};
use crate::services::{ImageUploader, UploadFrame, UploadStream};

/// Turns encoded images into stored-image URLs via an [`ImageUploader`].
pub struct ImageRelay<U> {
    uploader: U,
    max_image_bytes: usize,
}

impl<U: ImageUploader> ImageRelay<U> {
    /// Create a relay with the default 10 MiB image size limit.
    pub fn new(uploader: U) -> Self {
        Self {
            uploader,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Override the decoded image size limit.
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    /// Relay one encoded image and return its stored URL.
    ///
    /// Cancellation of `ctx` drops the in-flight upload and yields
    /// [`ImageRelayError::Cancelled`].
    pub async fn relay(&self, ctx: &CallContext, payload: &str) -> Result<String, ImageRelayError> {
        let image = decode_image(payload, self.max_image_bytes)?;

        ctx.run_until_cancelled(self.upload(ctx, image))
            .await
            .ok_or(ImageRelayError::Cancelled)?
    }

    async fn upload(&self, ctx: &CallContext, image: DecodedImage) -> Result<String, ImageRelayError> {
        let mut stream = self
            .uploader
            .open_upload(ctx)
            .await
            .map_err(ImageRelayError::Upload)?;

        stream
            .send(UploadFrame::Info {
                image_type: image.image_type,
            })
            .await
            .map_err(ImageRelayError::Upload)?;

        stream
            .send(UploadFrame::Chunk(image.bytes))
            .await
            .map_err(ImageRelayError::Upload)?;

        stream.close_and_recv().await.map_err(ImageRelayError::Upload)
    }
}
