//! Test helpers: stub collaborators and a session seeding layer.

use crate::db::models::User;
use crate::db::users::UserStore;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::session::{SessionUserId, SESSION_SECOND_FACTOR_KEY};
use crate::state::AppState;
use crate::viewdata::{ViewData, ViewDataProvider};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

/// In-memory [`UserStore`]; `failure` makes token lookups fail with that message.
#[derive(Default)]
pub struct StubUsers {
    pub users: Vec<User>,
    pub failure: Option<String>,
}

impl StubUsers {
    pub fn with_users(users: Vec<User>) -> Self {
        StubUsers {
            users,
            failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        StubUsers {
            users: Vec::new(),
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl UserStore for StubUsers {
    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.users.iter().find(|user| user.id == user_id).cloned())
    }

    async fn find_by_access_token(&self, token: &str) -> AppResult<Option<User>> {
        if let Some(message) = &self.failure {
            return Err(AppError::Unauthorized(message.clone()));
        }

        Ok(self
            .users
            .iter()
            .find(|user| user.access_token.as_deref() == Some(token))
            .cloned())
    }
}

pub struct StubViewData {
    pub fail: bool,
}

#[async_trait]
impl ViewDataProvider for StubViewData {
    async fn get_data(&self, user: Option<&User>) -> AppResult<ViewData> {
        if self.fail {
            return Err(AppError::Internal("view data unavailable".to_string()));
        }

        Ok(ViewData {
            site_title: "Helpdesk Test".to_string(),
            user: user.cloned().map(User::without_password),
            has_second_factor: user.is_some_and(User::has_second_factor),
            active_users: 3,
        })
    }
}

/// State with stub collaborators and an unconnected in-memory database.
pub fn test_state(users: StubUsers) -> AppState {
    test_state_with(users, StubViewData { fail: false })
}

pub fn test_state_with(users: StubUsers, viewdata: StubViewData) -> AppState {
    AppState::new(
        Arc::new(Database::new("sqlite::memory:", 1)),
        Arc::new(users),
        Arc::new(viewdata),
    )
}

/// Session values and request user to install before the gate under test runs.
///
/// The session seen by the request is kept so tests can inspect it afterwards.
#[derive(Clone, Default)]
pub struct Seed {
    user: Option<User>,
    session_user_id: Option<i64>,
    marker: Option<String>,
    captured: Arc<Mutex<Option<Session>>>,
}

impl Seed {
    pub fn new() -> Self {
        Seed::default()
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_session_user_id(mut self, user_id: i64) -> Self {
        self.session_user_id = Some(user_id);
        self
    }

    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = Some(marker.to_string());
        self
    }

    /// Session of the last request sent through this seed.
    pub fn session(&self) -> Session {
        self.captured
            .lock()
            .unwrap()
            .clone()
            .expect("no request with a session went through this seed")
    }
}

async fn apply_seed(State(seed): State<Seed>, mut request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();

    if let Some(session) = session {
        if let Some(marker) = seed.marker.clone() {
            session
                .insert(SESSION_SECOND_FACTOR_KEY, marker)
                .await
                .unwrap();
        }
        if let Some(user_id) = seed.session_user_id {
            SessionUserId::insert(&session, user_id).await.unwrap();
        }
        *seed.captured.lock().unwrap() = Some(session);
    }

    if let Some(user) = seed.user.clone() {
        request.extensions_mut().insert(CurrentUser(user));
    }

    next.run(request).await
}

/// Wrap `router` in the seed layer and an in-memory session layer.
pub fn with_session(router: Router, seed: &Seed) -> Router {
    without_session(router, seed).layer(SessionManagerLayer::new(MemoryStore::default()))
}

/// Wrap `router` in the seed layer only; requests carry no session.
pub fn without_session(router: Router, seed: &Seed) -> Router {
    router.layer(middleware::from_fn_with_state(seed.clone(), apply_seed))
}

pub async fn ok() -> StatusCode {
    StatusCode::OK
}

pub fn get_request(uri: &str) -> Request {
    axum::http::Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(router: Router, request: Request) -> Response {
    router.oneshot(request).await.unwrap()
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
