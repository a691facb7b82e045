//! HTTP clients for the identity, order and image services.
//!
//! Each client implements one of the capability traits from
//! [`review_core::services`], attaching the caller's propagated metadata as
//! request headers on every outbound call.

pub mod config;
pub mod error;
pub mod frame;
pub mod headers;
pub mod identity;
pub mod image;
pub mod order;

mod response;

pub use config::{UpstreamConfig, Upstreams};
pub use error::ClientError;
pub use identity::IdentityClient;
pub use image::ImageClient;
pub use order::OrderClient;
