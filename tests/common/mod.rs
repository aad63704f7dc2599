//! Scripted stand-in for the upstream guest and lookup endpoints.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;

use xcard::twitter::ClientOptions;

pub const POST_FIXTURE: &str = include_str!("../fixtures/post.json");
pub const NOT_FOUND_FIXTURE: &str = include_str!("../fixtures/not_found.json");
pub const TOMBSTONE_FIXTURE: &str = include_str!("../fixtures/tombstone.json");
pub const VISIBILITY_FIXTURE: &str = include_str!("../fixtures/visibility.json");

/// How the fake upstream answers.
#[derive(Debug, Clone)]
pub struct Script {
    pub activate_status: StatusCode,
    /// Activations after this many successful ones answer 503.
    pub failing_activations_after: Option<usize>,
    /// Leading lookups answered with 403 before `lookup_status` applies.
    pub forbidden_lookups: usize,
    pub lookup_status: StatusCode,
    pub lookup_body: String,
}

impl Script {
    pub fn ok(body: &str) -> Self {
        Self {
            activate_status: StatusCode::OK,
            failing_activations_after: None,
            forbidden_lookups: 0,
            lookup_status: StatusCode::OK,
            lookup_body: body.to_string(),
        }
    }
}

#[derive(Default)]
pub struct Hits {
    pub activations: AtomicUsize,
    pub lookups: AtomicUsize,
    /// `x-guest-token` header of every lookup, in order.
    pub tokens: Mutex<Vec<String>>,
    pub lookup_requests: Mutex<Vec<RecordedLookup>>,
}

/// What one lookup request carried.
#[derive(Debug, Clone)]
pub struct RecordedLookup {
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub query: HashMap<String, String>,
}

impl RecordedLookup {
    /// A query parameter parsed as JSON.
    pub fn json_param(&self, name: &str) -> serde_json::Value {
        serde_json::from_str(&self.query[name]).unwrap()
    }
}

#[derive(Clone)]
struct FakeState {
    script: Arc<Script>,
    hits: Arc<Hits>,
}

pub struct FakeUpstream {
    pub base: String,
    pub hits: Arc<Hits>,
}

impl FakeUpstream {
    pub async fn start(script: Script) -> Self {
        let hits = Arc::new(Hits::default());
        let state = FakeState {
            script: Arc::new(script),
            hits: hits.clone(),
        };
        let app = Router::new()
            .route("/activate.json", post(activate))
            .route("/TweetResultByRestId", get(lookup))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            hits,
        }
    }

    pub fn activate_url(&self) -> String {
        format!("{}/activate.json", self.base)
    }

    pub fn lookup_url(&self) -> String {
        format!("{}/TweetResultByRestId", self.base)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::default().with_endpoints(self.activate_url(), self.lookup_url())
    }

    pub fn activations(&self) -> usize {
        self.hits.activations.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.hits.lookups.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.hits.tokens.lock().clone()
    }

    pub fn lookup_requests(&self) -> Vec<RecordedLookup> {
        self.hits.lookup_requests.lock().clone()
    }
}

async fn activate(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    let n = state.hits.activations.fetch_add(1, Ordering::SeqCst) + 1;
    if !headers.contains_key("authorization") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state
        .script
        .failing_activations_after
        .is_some_and(|ok| n > ok)
    {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if !state.script.activate_status.is_success() {
        return state.script.activate_status.into_response();
    }
    (
        [("content-type", "application/json")],
        format!(r#"{{"guest_token":"guest-{n}"}}"#),
    )
        .into_response()
}

async fn lookup(
    State(state): State<FakeState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let n = state.hits.lookups.fetch_add(1, Ordering::SeqCst);
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state
        .hits
        .tokens
        .lock()
        .push(header("x-guest-token").unwrap_or_default());
    state.hits.lookup_requests.lock().push(RecordedLookup {
        authorization: header("authorization"),
        user_agent: header("user-agent"),
        query,
    });

    if n < state.script.forbidden_lookups {
        return StatusCode::FORBIDDEN.into_response();
    }
    (
        state.script.lookup_status,
        [("content-type", "application/json")],
        state.script.lookup_body.clone(),
    )
        .into_response()
}
