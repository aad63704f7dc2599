//! HTTP front end.
//!
//! Decides per request whether to redirect to the canonical page or to
//! render a preview document, and only ever calls the upstream for
//! preview bots.
//!
//! ## Routes
//!
//! - `GET /?id={id}` - always redirects, whatever the id looks like
//! - `GET /{id}` and `GET /{user}/status/{id}` - preview for bots, redirect otherwise
//! - `GET /health` - liveness (JSON)
//! - `GET /metrics` - Prometheus text
//! - `GET /robots.txt` - allow all crawlers

pub mod bots;
pub mod metrics;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::render::{canonical_url, render_preview};
use crate::twitter::{ErrorCode, LookupClient, UpstreamError};

use bots::BotMatcher;
use metrics::PROXY_METRICS;

/// Longest accepted identifier (digits in `u64::MAX`).
const MAX_ID_LEN: usize = 20;

const MISSING_ID_MESSAGE: &str =
    "Missing post id. Use /{id}, /{user}/status/{id} or /?id={id}.";

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Connection pool shared by the per-request lookup clients.
    pub http: reqwest::Client,
    pub bots: Arc<BotMatcher>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(config.upstream.timeout_secs))
            .build()?;
        let bots = BotMatcher::new(&config.extra_bot_agents);
        Ok(Self {
            config: Arc::new(config),
            http,
            bots: Arc::new(bots),
        })
    }

    /// A fresh lookup client for one request. Credentials are per client.
    fn lookup_client(&self) -> LookupClient {
        LookupClient::with_http_client(self.http.clone(), self.config.upstream.client_options())
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(query_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/robots.txt", get(robots_txt))
        .route("/{id}", get(path_handler))
        .route("/{user}/status/{id}", get(status_handler))
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let bind = config.bind.clone();
    let state = AppState::new(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(addr = %bind, "starting preview proxy");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("preview proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

async fn query_handler(State(state): State<AppState>, Query(query): Query<IdQuery>) -> Response {
    let Some(id) = query.id.filter(|id| !id.trim().is_empty()) else {
        return text_response(StatusCode::BAD_REQUEST, MISSING_ID_MESSAGE);
    };
    PROXY_METRICS.redirect("query");
    redirect(&canonical_url(&state.config.canonical_base, &id))
}

async fn path_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    preview_or_redirect(&state, &id, &headers).await
}

async fn status_handler(
    State(state): State<AppState>,
    Path((_user, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    preview_or_redirect(&state, &id, &headers).await
}

async fn preview_or_redirect(state: &AppState, id: &str, headers: &HeaderMap) -> Response {
    if let Err(response) = check_id(id) {
        return response;
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    if !state.bots.is_bot(user_agent) {
        debug!(post_id = id, "non-bot user agent, redirecting");
        PROXY_METRICS.redirect("path");
        return redirect(&canonical_url(&state.config.canonical_base, id));
    }

    debug!(post_id = id, user_agent, "rendering preview");
    let mut client = state.lookup_client();
    match client.get_post_info(id).await {
        Ok(post) => {
            PROXY_METRICS.previews_rendered.inc();
            let html = render_preview(&post, &state.config.canonical_base);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                    (header::CACHE_CONTROL, "public, max-age=300"),
                ],
                html,
            )
                .into_response()
        }
        Err(err) => {
            warn!(post_id = id, code = %err.code, error = %err.message, "lookup failed");
            PROXY_METRICS.lookup_failure(err.code.as_str());
            text_response(error_status(&err), &err.message)
        }
    }
}

/// HTTP status for a failed lookup.
///
/// An explicit status on the error wins; otherwise `RESTRICTED` is 451 and
/// everything else is 404.
pub fn error_status(err: &UpstreamError) -> StatusCode {
    err.status_code
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(match err.code {
            ErrorCode::Restricted => StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS,
            _ => StatusCode::NOT_FOUND,
        })
}

/// Post identifiers are decimal snowflakes.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}

fn check_id(id: &str) -> Result<(), Response> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(text_response(
            StatusCode::BAD_REQUEST,
            "Invalid post id: expected a numeric identifier.",
        ))
    }
}

fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => text_response(StatusCode::BAD_REQUEST, "Invalid redirect target."),
    }
}

fn text_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message.to_string(),
    )
        .into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn robots_txt() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\n",
    )
}
