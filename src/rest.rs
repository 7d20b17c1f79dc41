// Copyright 2026 Sitelens Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP surface for sitelens.
//!
//! One scrape endpoint plus liveness and health routes. This layer is the
//! sole point translating internal error kinds to transport-visible status
//! codes: 400 for invalid input (before any browser work), 504 when the
//! global deadline wins the race, 500 for everything else.

use crate::engine::chromium::ChromiumEngine;
use crate::engine::Engine;
use crate::error::ScrapeError;
use crate::scrape::{self, deadline, retry, ScrapeRequest};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared per-process state.
///
/// The engine handle is acquired lazily on the first scrape request —
/// startup stays cheap and a missing Chromium only surfaces when a request
/// actually needs it. `OnceCell` guards against concurrent first use.
pub struct AppState {
    engine: OnceCell<Arc<dyn Engine>>,
    started_at: Instant,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            engine: OnceCell::new(),
            started_at: Instant::now(),
        }
    }

    /// Build state with a pre-initialized engine (used by tests).
    pub fn with_engine(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine: OnceCell::new_with(Some(engine)),
            started_at: Instant::now(),
        }
    }

    async fn engine(&self) -> Result<Arc<dyn Engine>, ScrapeError> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                let engine = ChromiumEngine::new()
                    .map_err(|e| ScrapeError::Engine(format!("{e:#}")))?;
                Ok::<Arc<dyn Engine>, ScrapeError>(Arc::new(engine))
            })
            .await?;
        Ok(Arc::clone(engine))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the axum Router with all endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/scrape", get(handle_scrape))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("sitelens listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

async fn index() -> &'static str {
    "sitelens is running"
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
    }))
}

#[derive(serde::Deserialize, Default)]
struct ScrapeParams {
    url: Option<String>,
    ua: Option<String>,
}

async fn handle_scrape(
    Query(params): Query<ScrapeParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    // Validation happens before the engine is touched (or even created).
    let request = match ScrapeRequest::parse(params.url.as_deref().unwrap_or(""), params.ua) {
        Ok(request) => request,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid URL" })),
            )
                .into_response();
        }
    };

    let engine = match state.engine().await {
        Ok(engine) => engine,
        Err(e) => {
            error!("engine unavailable: {e}");
            return scrape_failed(&e);
        }
    };

    info!(url = %request.url, "scrape request");

    let outcome = deadline::bounded(
        retry::run(engine.as_ref(), &request),
        scrape::GLOBAL_DEADLINE,
    )
    .await;

    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(ScrapeError::DeadlineExceeded) => {
            info!(url = %request.url, "scrape deadline exceeded");
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({ "error": "Timeout" })),
            )
                .into_response()
        }
        Err(e) => scrape_failed(&e),
    }
}

fn scrape_failed(e: &ScrapeError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Scraping failed", "details": e.to_string() })),
    )
        .into_response()
}
