use std::time::Duration;

use crate::error::ClientError;
use crate::identity::IdentityClient;
use crate::image::{ImageClient, DEFAULT_UPLOAD_BUFFER_FRAMES};
use crate::order::OrderClient;

/// Upstream service locations and HTTP client settings.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Identity service base URL (default: `http://auth-service:8080`).
    pub identity_url: String,
    /// Order service base URL (default: `http://order-service:8080`).
    pub order_url: String,
    /// Image service base URL (default: `http://image-service:8080`).
    pub image_url: String,
    /// Per-request timeout for upstream calls in seconds (default: `10`).
    pub timeout_secs: u64,
    /// Frames buffered ahead of an image upload body (default: `2`).
    pub upload_buffer_frames: usize,
}

impl UpstreamConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                     |
    /// |------------------------------|-----------------------------|
    /// | `IDENTITY_SERVICE_URL`       | `http://auth-service:8080`  |
    /// | `ORDER_SERVICE_URL`          | `http://order-service:8080` |
    /// | `IMAGE_SERVICE_URL`          | `http://image-service:8080` |
    /// | `UPSTREAM_TIMEOUT_SECS`      | `10`                        |
    /// | `IMAGE_UPLOAD_BUFFER_FRAMES` | `2`                         |
    pub fn from_env() -> Self {
        let identity_url = std::env::var("IDENTITY_SERVICE_URL")
            .unwrap_or_else(|_| "http://auth-service:8080".into());

        let order_url = std::env::var("ORDER_SERVICE_URL")
            .unwrap_or_else(|_| "http://order-service:8080".into());

        let image_url = std::env::var("IMAGE_SERVICE_URL")
            .unwrap_or_else(|_| "http://image-service:8080".into());

        let timeout_secs: u64 = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("UPSTREAM_TIMEOUT_SECS must be a valid u64");

        let upload_buffer_frames: usize = std::env::var("IMAGE_UPLOAD_BUFFER_FRAMES")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_BUFFER_FRAMES.to_string())
            .parse()
            .expect("IMAGE_UPLOAD_BUFFER_FRAMES must be a valid usize");

        Self {
            identity_url,
            order_url,
            image_url,
            timeout_secs,
            upload_buffer_frames,
        }
    }
}

/// The three upstream clients, sharing one connection pool.
#[derive(Clone)]
pub struct Upstreams {
    pub identity: IdentityClient,
    pub order: OrderClient,
    pub image: ImageClient,
}

impl Upstreams {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            identity: IdentityClient::new(client.clone(), &config.identity_url),
            order: OrderClient::new(client.clone(), &config.order_url),
            image: ImageClient::new(client, &config.image_url)
                .with_buffer_frames(config.upload_buffer_frames),
        })
    }
}
