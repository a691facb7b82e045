use std::sync::Arc;

use review_clients::{ClientError, IdentityClient, ImageClient, OrderClient, Upstreams};
use review_core::submission::ReviewWriteCoordinator;
use review_db::store::PgReviewStore;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// The review write path wired to the HTTP upstreams and Postgres.
pub type ReviewCoordinator =
    ReviewWriteCoordinator<OrderClient, IdentityClient, ImageClient, PgReviewStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: review_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Review submission coordinator shared by every request.
    pub coordinator: Arc<ReviewCoordinator>,
    /// Cancelled when the server begins shutting down. Each submission runs
    /// under a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build the state, creating the upstream clients from `config`.
    pub fn new(pool: review_db::DbPool, config: ServerConfig) -> Result<Self, ClientError> {
        let upstreams = Upstreams::from_config(&config.upstreams)?;

        let coordinator = ReviewWriteCoordinator::new(
            upstreams.order,
            upstreams.identity,
            upstreams.image,
            PgReviewStore::new(pool.clone()),
        )
        .with_image_concurrency(config.image_relay_concurrency)
        .with_max_image_bytes(config.max_image_bytes);

        Ok(Self {
            pool,
            config: Arc::new(config),
            coordinator: Arc::new(coordinator),
            shutdown: CancellationToken::new(),
        })
    }
}
