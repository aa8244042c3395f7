//! In-process mock of the DermX backend.
//!
//! Serves the same routes as the real backend on an ephemeral port so the
//! client can be exercised over real HTTP.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use dermx_client::{AuthState, BackendClient, SessionStore};

pub const PASSWORD: &str = "correct-horse";
pub const SLOW_DELAY: Duration = Duration::from_millis(300);

/// Request counters per route.
#[derive(Debug, Default)]
pub struct Hits {
    pub signup: AtomicUsize,
    pub login: AtomicUsize,
    pub profile: AtomicUsize,
    pub delete: AtomicUsize,
    pub photo: AtomicUsize,
    pub analyze: AtomicUsize,
}

impl Hits {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        [
            &self.signup,
            &self.login,
            &self.profile,
            &self.delete,
            &self.photo,
            &self.analyze,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

/// What the analyze endpoint received.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
    pub bearer: Option<String>,
}

/// Shared mock state: counters, failure switches and captured requests.
#[derive(Debug, Default)]
pub struct MockState {
    pub hits: Hits,
    pub fail_signup: AtomicBool,
    pub fail_profile: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_photo: AtomicBool,
    pub fail_analyze: AtomicBool,
    pub slow_signup: AtomicBool,
    pub slow_tokens: Mutex<HashSet<String>>,
    pub last_signup: Mutex<Option<Value>>,
    pub last_upload: Mutex<Option<UploadRecord>>,
}

impl MockState {
    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn slow_down(&self, token: &str) {
        self.slow_tokens.lock().unwrap().insert(token.to_string());
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/api/auth/signup-complete", post(signup_complete))
            .route("/api/auth/login", post(login))
            .route("/api/users/profile", get(profile))
            .route("/api/users/account", delete(delete_account))
            .route("/api/users/profile/photo", post(photo))
            .route("/api/diagnosis/analyze", post(analyze))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/", addr),
            state,
        }
    }

    pub fn client(&self) -> BackendClient {
        BackendClient::new(&self.base_url).unwrap()
    }

    pub fn hits(&self) -> &Hits {
        &self.state.hits
    }
}

/// The profile every valid token resolves to.
pub fn profile_body(token: &str) -> Value {
    json!({
        "id": "u-42",
        "email": "ada@example.com",
        "name": "Ada Lovelace",
        "skinType": "III",
        "photoUrl": "https://cdn.example/old.png",
        "tokenSeen": token,
    })
}

pub fn diagnosis_body() -> Value {
    json!({
        "result": {
            "condition": "Eczema",
            "confidence": 87.5,
            "description": "Inflammatory skin condition causing itchy, dry patches.",
            "top3": [
                { "class": "Eczema", "confidence": 87.5 },
                { "class": "Psoriasis", "confidence": 8.25 },
                { "class": "Contact dermatitis", "confidence": 4.25 }
            ],
            "recommendations": ["Moisturize daily", "Avoid known irritants"]
        }
    })
}

/// Wait (bounded) until the store reaches a state matching `pred`.
pub async fn wait_for_state<F>(store: &SessionStore, pred: F) -> AuthState
where
    F: FnMut(&AuthState) -> bool,
{
    let mut rx = store.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for auth state")
        .expect("session store closed")
        .clone();
    state
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

fn failing(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}

async fn signup_complete(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> StatusCode {
    state.hits.signup.fetch_add(1, Ordering::SeqCst);
    *state.last_signup.lock().unwrap() = Some(body);
    if state.slow_signup.load(Ordering::SeqCst) {
        tokio::time::sleep(SLOW_DELAY).await;
    }
    if failing(&state.fail_signup) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::OK
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.hits.login.fetch_add(1, Ordering::SeqCst);
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response();
    }
    Json(json!({
        "token": format!("cred-token-{}", email),
        "user": { "email": email }
    }))
    .into_response()
}

async fn profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.hits.profile.fetch_add(1, Ordering::SeqCst);
    let Some(token) = bearer(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let slow = state.slow_tokens.lock().unwrap().contains(&token);
    if slow {
        tokio::time::sleep(SLOW_DELAY).await;
    }

    if failing(&state.fail_profile) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(profile_body(&token)).into_response()
}

async fn delete_account(State(state): State<Arc<MockState>>, headers: HeaderMap) -> StatusCode {
    state.hits.delete.fetch_add(1, Ordering::SeqCst);
    if bearer(&headers).is_none() {
        return StatusCode::UNAUTHORIZED;
    }
    if failing(&state.fail_delete) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::NO_CONTENT
}

async fn photo(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hits.photo.fetch_add(1, Ordering::SeqCst);
    if bearer(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if failing(&state.fail_photo) {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!({ "photoUrl": body["photoUrl"] })).into_response()
}

async fn analyze(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.hits.analyze.fetch_add(1, Ordering::SeqCst);

    while let Ok(Some(field)) = multipart.next_field().await {
        let record = UploadRecord {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_owned),
            content_type: field.content_type().map(str::to_owned),
            len: 0,
            bearer: bearer(&headers),
        };
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        *state.last_upload.lock().unwrap() = Some(UploadRecord { len, ..record });
    }

    if failing(&state.fail_analyze) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "model unavailable").into_response();
    }
    Json(diagnosis_body()).into_response()
}
