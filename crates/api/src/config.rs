use std::time::Duration;

use review_clients::UpstreamConfig;
use review_core::image_payload::DEFAULT_MAX_IMAGE_BYTES;
use review_core::submission::DEFAULT_IMAGE_CONCURRENCY;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Deadline of one review submission in milliseconds (default: request
    /// timeout minus 5s). Remote calls still pending at the deadline are
    /// cancelled.
    pub submission_deadline_ms: u64,
    /// How long in-flight requests may drain after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Maximum accepted request body size in bytes (default: 32 MiB).
    pub max_body_bytes: usize,
    /// Inbound headers forwarded to upstream services, lower-cased.
    pub propagated_headers: Vec<String>,
    /// Images of one submission relayed concurrently (default: `4`).
    pub image_relay_concurrency: usize,
    /// Decoded size limit of a single image in bytes (default: 10 MiB).
    pub max_image_bytes: usize,
    /// Identity, order and image service settings.
    pub upstreams: UpstreamConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                      |
    /// |---------------------------|------------------------------|
    /// | `HOST`                    | `0.0.0.0`                    |
    /// | `PORT`                    | `8080`                       |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                         |
    /// | `SUBMISSION_DEADLINE_MS`  | `25000`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                         |
    /// | `MAX_BODY_BYTES`          | `33554432`                   |
    /// | `PROPAGATED_HEADERS`      | `authorization,x-request-id` |
    /// | `IMAGE_RELAY_CONCURRENCY` | `4`                          |
    /// | `MAX_IMAGE_BYTES`         | `10485760`                   |
    ///
    /// Upstream settings are documented on [`UpstreamConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let submission_deadline_ms: u64 = std::env::var("SUBMISSION_DEADLINE_MS")
            .map(|v| v.parse().expect("SUBMISSION_DEADLINE_MS must be a valid u64"))
            .unwrap_or_else(|_| request_timeout_secs.saturating_sub(5).max(1) * 1000);

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .unwrap_or_else(|_| (32 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_BODY_BYTES must be a valid usize");

        let propagated_headers = parse_header_list(
            &std::env::var("PROPAGATED_HEADERS")
                .unwrap_or_else(|_| "authorization,x-request-id".into()),
        );

        let image_relay_concurrency: usize = std::env::var("IMAGE_RELAY_CONCURRENCY")
            .unwrap_or_else(|_| DEFAULT_IMAGE_CONCURRENCY.to_string())
            .parse()
            .expect("IMAGE_RELAY_CONCURRENCY must be a valid usize");

        let max_image_bytes: usize = std::env::var("MAX_IMAGE_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_IMAGE_BYTES.to_string())
            .parse()
            .expect("MAX_IMAGE_BYTES must be a valid usize");

        Self {
            host,
            port,
            request_timeout_secs,
            submission_deadline_ms,
            shutdown_timeout_secs,
            max_body_bytes,
            propagated_headers,
            image_relay_concurrency,
            max_image_bytes,
            upstreams: UpstreamConfig::from_env(),
        }
    }

    /// Submission deadline, capped at 90% of the request timeout.
    pub fn submission_deadline(&self) -> Duration {
        let cap = Duration::from_secs(self.request_timeout_secs) * 9 / 10;
        Duration::from_millis(self.submission_deadline_ms).min(cap)
    }
}

/// Split a comma-separated header list, lower-casing and dropping blanks.
pub fn parse_header_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
