//! In-memory collaborators for coordinator and relay tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::context::{CallContext, CallMetadata, CREDENTIAL_KEY};
use crate::error::{RemoteError, StoreError};
use crate::services::{
    ClaimsResolver, ImageUploader, NewReview, PurchaseVerifier, ReviewStore, UploadFrame,
    UploadStream, UserClaims,
};
use crate::types::{DbId, ProductId};

pub const TEST_CREDENTIAL: &str = "Bearer token-7";

/// Inbound metadata of an authenticated caller.
pub fn credentials() -> CallMetadata {
    [(CREDENTIAL_KEY, TEST_CREDENTIAL), ("x-request-id", "req-1")]
        .into_iter()
        .collect()
}

pub fn authorized_context(cancel: CancellationToken) -> CallContext {
    CallContext::from_inbound(credentials(), cancel).expect("credentials are present")
}

fn authorization(ctx: &CallContext) -> Option<String> {
    ctx.metadata().get(CREDENTIAL_KEY).map(str::to_string)
}

/* --------------------------------------------------------------------------
Order service
-------------------------------------------------------------------------- */

#[derive(Clone)]
pub struct FakeOrderService {
    answer: Result<bool, RemoteError>,
    calls: Arc<AtomicUsize>,
    last_authorization: Arc<Mutex<Option<String>>>,
}

impl FakeOrderService {
    fn answering(answer: Result<bool, RemoteError>) -> Self {
        Self {
            answer,
            calls: Arc::default(),
            last_authorization: Arc::default(),
        }
    }

    pub fn bought() -> Self {
        Self::answering(Ok(true))
    }

    pub fn not_bought() -> Self {
        Self::answering(Ok(false))
    }

    pub fn failing(error: RemoteError) -> Self {
        Self::answering(Err(error))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }
}

impl PurchaseVerifier for FakeOrderService {
    async fn check_order_is_handled(
        &self,
        ctx: &CallContext,
        _product_id: ProductId,
    ) -> Result<bool, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_authorization.lock().unwrap() = authorization(ctx);
        self.answer.clone()
    }
}

/* --------------------------------------------------------------------------
Identity service
-------------------------------------------------------------------------- */

#[derive(Clone)]
pub struct FakeIdentityService {
    answer: Result<UserClaims, RemoteError>,
    calls: Arc<AtomicUsize>,
    last_authorization: Arc<Mutex<Option<String>>>,
}

impl FakeIdentityService {
    fn answering(answer: Result<UserClaims, RemoteError>) -> Self {
        Self {
            answer,
            calls: Arc::default(),
            last_authorization: Arc::default(),
        }
    }

    pub fn with_id(id: &str) -> Self {
        Self::answering(Ok(UserClaims { id: id.to_string() }))
    }

    pub fn failing(error: RemoteError) -> Self {
        Self::answering(Err(error))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }
}

impl ClaimsResolver for FakeIdentityService {
    async fn get_user_claims(&self, ctx: &CallContext) -> Result<UserClaims, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_authorization.lock().unwrap() = authorization(ctx);
        self.answer.clone()
    }
}

/* --------------------------------------------------------------------------
Image service
-------------------------------------------------------------------------- */

/// An upload the fake image service accepted.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub frames: Vec<UploadFrame>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct ImageServiceState {
    opened: usize,
    stored: usize,
    completed: Vec<RecordedUpload>,
    failing_types: HashSet<String>,
    hanging_types: HashSet<String>,
    delays: HashMap<String, Duration>,
}

#[derive(Clone, Default)]
pub struct FakeImageService {
    state: Arc<Mutex<ImageServiceState>>,
    hanging: Arc<Notify>,
    fail_all: bool,
    hang_all: bool,
}

impl FakeImageService {
    /// Every upload is rejected with a 500 when closed.
    pub fn failing_on_close(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Every upload blocks forever when closed.
    pub fn hanging(mut self) -> Self {
        self.hang_all = true;
        self
    }

    pub fn fail_image_type(&self, image_type: &str) {
        self.state.lock().unwrap().failing_types.insert(image_type.to_string());
    }

    pub fn hang_image_type(&self, image_type: &str) {
        self.state.lock().unwrap().hanging_types.insert(image_type.to_string());
    }

    pub fn delay_image_type(&self, image_type: &str, delay: Duration) {
        self.state
            .lock()
            .unwrap()
            .delays
            .insert(image_type.to_string(), delay);
    }

    /// Resolves once some upload is blocked in a hang.
    pub async fn wait_until_hanging(&self) {
        self.hanging.notified().await;
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn completed_uploads(&self) -> Vec<RecordedUpload> {
        self.state.lock().unwrap().completed.clone()
    }
}

pub struct FakeUpload {
    service: FakeImageService,
    frames: Vec<UploadFrame>,
    authorization: Option<String>,
}

impl ImageUploader for FakeImageService {
    type Upload = FakeUpload;

    async fn open_upload(&self, ctx: &CallContext) -> Result<FakeUpload, RemoteError> {
        self.state.lock().unwrap().opened += 1;
        Ok(FakeUpload {
            service: self.clone(),
            frames: Vec::new(),
            authorization: authorization(ctx),
        })
    }
}

impl UploadStream for FakeUpload {
    async fn send(&mut self, frame: UploadFrame) -> Result<(), RemoteError> {
        self.frames.push(frame);
        Ok(())
    }

    async fn close_and_recv(self) -> Result<String, RemoteError> {
        let image_type = match self.frames.first() {
            Some(UploadFrame::Info { image_type }) => image_type.clone(),
            _ => {
                return Err(RemoteError::Status {
                    status: 400,
                    body: "missing info frame".into(),
                })
            }
        };

        let (fail, hang, delay) = {
            let state = self.service.state.lock().unwrap();
            (
                self.service.fail_all || state.failing_types.contains(&image_type),
                self.service.hang_all || state.hanging_types.contains(&image_type),
                state.delays.get(&image_type).copied(),
            )
        };

        if hang {
            self.service.hanging.notify_one();
            std::future::pending::<()>().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(RemoteError::Status {
                status: 500,
                body: "storage unavailable".into(),
            });
        }

        let mut state = self.service.state.lock().unwrap();
        state.stored += 1;
        let url = format!("https://images.test/{}.{image_type}", state.stored);
        state.completed.push(RecordedUpload {
            frames: self.frames,
            authorization: self.authorization,
        });
        Ok(url)
    }
}

/* --------------------------------------------------------------------------
Store
-------------------------------------------------------------------------- */

#[derive(Default)]
struct StoreState {
    next_id: DbId,
    insert_attempts: usize,
    reviews: Vec<(DbId, NewReview)>,
    images: Vec<(DbId, String, i32)>,
}

#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<StoreState>>,
    fail_reviews: bool,
    fail_images: bool,
}

impl FakeStore {
    pub fn failing_reviews() -> Self {
        Self {
            fail_reviews: true,
            ..Self::default()
        }
    }

    pub fn failing_images() -> Self {
        Self {
            fail_images: true,
            ..Self::default()
        }
    }

    pub fn insert_attempts(&self) -> usize {
        self.state.lock().unwrap().insert_attempts
    }

    pub fn reviews(&self) -> Vec<(DbId, NewReview)> {
        self.state.lock().unwrap().reviews.clone()
    }

    pub fn images(&self) -> Vec<(DbId, String, i32)> {
        self.state.lock().unwrap().images.clone()
    }
}

impl ReviewStore for FakeStore {
    async fn insert_review(&self, review: &NewReview) -> Result<DbId, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.insert_attempts += 1;
        if self.fail_reviews {
            return Err(StoreError("connection reset".into()));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.reviews.push((id, review.clone()));
        Ok(id)
    }

    async fn insert_image(
        &self,
        review_id: DbId,
        image_url: &str,
        position: i32,
    ) -> Result<(), StoreError> {
        if self.fail_images {
            return Err(StoreError("foreign key violation".into()));
        }
        self.state
            .lock()
            .unwrap()
            .images
            .push((review_id, image_url.to_string(), position));
        Ok(())
    }
}
