pub mod health;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /reviews                                         create (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/reviews", reviews::router())
}
