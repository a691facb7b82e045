//! Capability traits for the collaborators of the review write path.
//!
//! The coordinator only ever talks to the identity, order and image services
//! and to storage through these traits, so production wires in network and
//! database implementations while tests substitute in-memory doubles.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::error::{RemoteError, StoreError};
use crate::types::{DbId, ProductId, UserId};

/// Claims returned by the identity service for the current caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// The caller's user id, as a decimal string.
    pub id: String,
}

/// One frame of a streaming image upload.
///
/// An upload is exactly one [`UploadFrame::Info`] followed by data frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFrame {
    /// Leading metadata frame naming the image subtype (`png`, `jpeg`, ...).
    Info { image_type: String },
    /// Raw image bytes.
    Chunk(Vec<u8>),
}

/// Order service: has the current caller bought a product?
pub trait PurchaseVerifier: Send + Sync {
    fn check_order_is_handled(
        &self,
        ctx: &CallContext,
        product_id: ProductId,
    ) -> impl Future<Output = Result<bool, RemoteError>> + Send;
}

/// Identity service: who is the current caller?
pub trait ClaimsResolver: Send + Sync {
    fn get_user_claims(
        &self,
        ctx: &CallContext,
    ) -> impl Future<Output = Result<UserClaims, RemoteError>> + Send;
}

/// Image service: opens client-streaming uploads.
pub trait ImageUploader: Send + Sync {
    type Upload: UploadStream;

    /// Open a new upload unit-of-work on behalf of the caller in `ctx`.
    fn open_upload(
        &self,
        ctx: &CallContext,
    ) -> impl Future<Output = Result<Self::Upload, RemoteError>> + Send;
}

/// An open client-streaming upload.
pub trait UploadStream: Send {
    /// Send one frame. Waits while the stream's buffer is full.
    fn send(&mut self, frame: UploadFrame) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Close the sending half and wait for the stored image URL.
    fn close_and_recv(self) -> impl Future<Output = Result<String, RemoteError>> + Send;
}

/// Review fields written by [`ReviewStore::insert_review`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub num_star: i32,
    pub content: String,
}

/// Storage operations used on the write path.
pub trait ReviewStore: Send + Sync {
    /// Insert a review and return the id assigned by storage.
    fn insert_review(
        &self,
        review: &NewReview,
    ) -> impl Future<Output = Result<DbId, StoreError>> + Send;

    /// Record a stored image for a review. `position` is the image's index
    /// in the submission.
    fn insert_image(
        &self,
        review_id: DbId,
        image_url: &str,
        position: i32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
