//! Shared helpers for the API integration tests.
//!
//! [`FakeUpstreams`] serves the identity, order and image endpoints from one
//! in-process axum server so the real HTTP clients run end to end.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::Response;
use axum::routing::{get as route_get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use review_api::config::{parse_header_list, ServerConfig};
use review_api::router::build_app_router;
use review_api::state::AppState;
use review_clients::frame::decode_frames;
use review_clients::UpstreamConfig;
use review_core::services::UploadFrame;
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

pub const TEST_TOKEN: &str = "Bearer test-token";

/// "hello" as a PNG data URL.
pub const PNG_IMAGE: &str = "data:image/png;base64,aGVsbG8=";

/// "world" as a JPEG data URL.
pub const JPEG_IMAGE: &str = "data:image/jpeg;base64,d29ybGQ=";

// ---------------------------------------------------------------------------
// Fake upstream services
// ---------------------------------------------------------------------------

/// One request received by a fake upstream.
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub path: &'static str,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

struct FakeState {
    is_bought: bool,
    order_status: StatusCode,
    user_id: String,
    failing_image_types: Vec<String>,
    hanging_image_types: Vec<String>,
    stored_images: usize,
    calls: Vec<SeenCall>,
}

#[derive(Clone)]
pub struct FakeUpstreams {
    state: Arc<Mutex<FakeState>>,
    hanging: Arc<Notify>,
}

impl Default for FakeUpstreams {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                is_bought: true,
                order_status: StatusCode::OK,
                user_id: "42".to_string(),
                failing_image_types: Vec::new(),
                hanging_image_types: Vec::new(),
                stored_images: 0,
                calls: Vec::new(),
            })),
            hanging: Arc::new(Notify::new()),
        }
    }
}

impl FakeUpstreams {
    pub fn not_bought(self) -> Self {
        self.state.lock().unwrap().is_bought = false;
        self
    }

    pub fn order_status(self, status: StatusCode) -> Self {
        self.state.lock().unwrap().order_status = status;
        self
    }

    pub fn user_id(self, id: &str) -> Self {
        self.state.lock().unwrap().user_id = id.to_string();
        self
    }

    pub fn fail_image_type(self, image_type: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_image_types
            .push(image_type.to_string());
        self
    }

    /// Uploads of this type never get a response.
    pub fn hang_image_type(self, image_type: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .hanging_image_types
            .push(image_type.to_string());
        self
    }

    /// Resolves once an upload is blocked on a hanging image type.
    pub async fn wait_until_hanging(&self) {
        self.hanging.notified().await;
    }

    pub fn calls(&self) -> Vec<SeenCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, path: &'static str, headers: &HeaderMap) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.state.lock().unwrap().calls.push(SeenCall {
            path,
            authorization: header("authorization"),
            request_id: header("x-request-id"),
        });
    }

    /// Serve the fake endpoints on an ephemeral port and return the base URL.
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/api/v1/claims", route_get(claims))
            .route("/api/v1/orders/check-handled", post(check_handled))
            .route("/api/v1/images/upload", post(upload_image))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn claims(State(fake): State<FakeUpstreams>, headers: HeaderMap) -> Json<Value> {
    fake.record("/api/v1/claims", &headers);
    let id = fake.state.lock().unwrap().user_id.clone();
    Json(json!({ "id": id }))
}

async fn check_handled(
    State(fake): State<FakeUpstreams>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.record("/api/v1/orders/check-handled", &headers);
    let state = fake.state.lock().unwrap();
    (
        state.order_status,
        Json(json!({ "is_bought": state.is_bought })),
    )
}

async fn upload_image(
    State(fake): State<FakeUpstreams>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    fake.record("/api/v1/images/upload", &headers);
    let image_type = match decode_frames(&body).as_deref() {
        Ok([UploadFrame::Info { image_type }, UploadFrame::Chunk(_)]) => image_type.clone(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "unexpected frames" })),
            )
        }
    };

    let hangs = fake
        .state
        .lock()
        .unwrap()
        .hanging_image_types
        .contains(&image_type);
    if hangs {
        fake.hanging.notify_one();
        std::future::pending::<()>().await;
    }

    let mut state = fake.state.lock().unwrap();
    if state.failing_image_types.contains(&image_type) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "storage unavailable" })),
        );
    }
    state.stored_images += 1;
    let url = format!("https://cdn.test/{}.{image_type}", state.stored_images);
    (StatusCode::OK, Json(json!({ "image_url": url })))
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with all upstreams pointing at `upstream_url`.
pub fn test_config(upstream_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        submission_deadline_ms: 25_000,
        shutdown_timeout_secs: 30,
        max_body_bytes: 32 * 1024 * 1024,
        propagated_headers: parse_header_list("authorization,x-request-id"),
        image_relay_concurrency: 4,
        max_image_bytes: 10 * 1024 * 1024,
        upstreams: UpstreamConfig {
            identity_url: upstream_url.to_string(),
            order_url: upstream_url.to_string(),
            image_url: upstream_url.to_string(),
            timeout_secs: 5,
            upload_buffer_frames: 2,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and upstream base URL.
pub fn build_test_app(pool: PgPool, upstream_url: &str) -> Router {
    build_test_app_with(pool, test_config(upstream_url)).0
}

/// Build the application from an explicit config, also returning the
/// server's shutdown token.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> (Router, CancellationToken) {
    let state = AppState::new(pool, config.clone()).unwrap();
    let shutdown = state.shutdown.clone();
    (build_app_router(state, &config), shutdown)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and extra headers through the router.
pub async fn post_json(app: Router, uri: &str, body: Value, headers: &[(&str, &str)]) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Headers of an authenticated caller.
pub fn auth_headers() -> Vec<(&'static str, &'static str)> {
    vec![("authorization", TEST_TOKEN), ("x-request-id", "req-test-1")]
}
