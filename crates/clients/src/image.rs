//! Streaming client for the image service.
//!
//! An upload is one `POST /api/v1/images/upload` whose body is fed frame by
//! frame through a bounded channel. The request runs on its own task, so
//! [`UploadStream::send`] waits whenever the channel is full and the request
//! is aborted if the [`HttpUpload`] is dropped before completion.

use std::io;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use review_core::context::CallContext;
use review_core::error::RemoteError;
use review_core::services::{ImageUploader, UploadFrame, UploadStream};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::task::AbortOnDropHandle;

use crate::error::ClientError;
use crate::frame::{encode_frame, UPLOAD_CONTENT_TYPE};
use crate::headers::propagated_headers;
use crate::response::parse_response;

/// Default number of encoded frames buffered ahead of the request body.
pub const DEFAULT_UPLOAD_BUFFER_FRAMES: usize = 2;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    image_url: String,
}

type BodyChunk = Result<Bytes, io::Error>;

type UploadHandle = AbortOnDropHandle<Result<String, ClientError>>;

/// Opens streaming uploads against the image service.
#[derive(Clone)]
pub struct ImageClient {
    client: reqwest::Client,
    base_url: String,
    buffer_frames: usize,
}

impl ImageClient {
    /// * `base_url` - e.g. `http://image-service:8080`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            buffer_frames: DEFAULT_UPLOAD_BUFFER_FRAMES,
        }
    }

    /// Override how many frames may be queued before `send` waits.
    pub fn with_buffer_frames(mut self, buffer_frames: usize) -> Self {
        self.buffer_frames = buffer_frames.max(1);
        self
    }

    /// Start an upload on behalf of the caller in `ctx`.
    pub fn start_upload(&self, ctx: &CallContext) -> Result<HttpUpload, ClientError> {
        let headers = propagated_headers(ctx.metadata())?;
        let (tx, rx) = mpsc::channel::<BodyChunk>(self.buffer_frames);

        let request = self
            .client
            .post(format!("{}/api/v1/images/upload", self.base_url))
            .headers(headers)
            .header(CONTENT_TYPE, UPLOAD_CONTENT_TYPE)
            .body(reqwest::Body::wrap_stream(ReceiverStream::new(rx)));

        let response = AbortOnDropHandle::new(tokio::spawn(async move {
            let response = request.send().await?;
            let body: UploadResponse = parse_response(response).await?;
            Ok::<_, ClientError>(body.image_url)
        }));

        Ok(HttpUpload {
            frames: tx,
            response,
        })
    }
}

/// One in-flight upload request.
pub struct HttpUpload {
    frames: mpsc::Sender<BodyChunk>,
    response: UploadHandle,
}

impl HttpUpload {
    async fn send_frame(&mut self, frame: UploadFrame) -> Result<(), ClientError> {
        let encoded = encode_frame(&frame)?;
        if self.frames.send(Ok(encoded)).await.is_ok() {
            return Ok(());
        }

        // The request ended before its body did. Report how it ended.
        match join_response(&mut self.response).await {
            Ok(_) => Err(ClientError::StreamClosed),
            Err(e) => Err(e),
        }
    }

    async fn finish(self) -> Result<String, ClientError> {
        let HttpUpload {
            frames,
            mut response,
        } = self;
        drop(frames);

        join_response(&mut response).await
    }
}

async fn join_response(response: &mut UploadHandle) -> Result<String, ClientError> {
    match response.await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "Image upload task did not complete");
            Err(ClientError::StreamClosed)
        }
    }
}

impl ImageUploader for ImageClient {
    type Upload = HttpUpload;

    async fn open_upload(&self, ctx: &CallContext) -> Result<HttpUpload, RemoteError> {
        Ok(self.start_upload(ctx)?)
    }
}

impl UploadStream for HttpUpload {
    async fn send(&mut self, frame: UploadFrame) -> Result<(), RemoteError> {
        Ok(self.send_frame(frame).await?)
    }

    async fn close_and_recv(self) -> Result<String, RemoteError> {
        Ok(self.finish().await?)
    }
}
