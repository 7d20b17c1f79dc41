//! End-to-end tests of the scrape API against a scripted mock engine:
//! validation short-circuits, retry/session accounting, error mapping,
//! and the global deadline.

use anyhow::{bail, Result};
use assert_json_diff::assert_json_eq;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sitelens::engine::{BrowserSession, Engine};
use sitelens::rest::{router, AppState};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

// ── Mock engine ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct Page {
    title: Option<String>,
    meta_description: Option<String>,
    og_description: Option<String>,
    h1: Option<String>,
}

#[derive(Debug, Clone)]
enum Script {
    Loads(Page),
    NavigationFails(String),
    /// Navigation never completes; only the global deadline can end it.
    Hangs,
}

#[derive(Default)]
struct MockEngine {
    script: Mutex<VecDeque<Script>>,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
    last_user_agent: Mutex<Option<String>>,
}

impl MockEngine {
    fn scripted(outcomes: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.into()),
            ..Default::default()
        })
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn open_session(&self, user_agent: Option<&str>) -> Result<Box<dyn BrowserSession>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_user_agent.lock().unwrap() = user_agent.map(str::to_string);
        let script = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Loads(Page::default()));
        Ok(Box::new(MockSession {
            script,
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct MockSession {
    script: Script,
    closed: Arc<AtomicUsize>,
}

impl MockSession {
    fn page(&self) -> Result<&Page> {
        match &self.script {
            Script::Loads(page) => Ok(page),
            _ => bail!("page never loaded"),
        }
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn navigate(&mut self, _url: &str, _timeout: Duration) -> Result<()> {
        match &self.script {
            Script::Loads(_) => Ok(()),
            Script::NavigationFails(msg) => bail!("{msg}"),
            Script::Hangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                bail!("navigation hung")
            }
        }
    }

    async fn title(&self) -> Result<Option<String>> {
        Ok(self.page()?.title.clone())
    }

    async fn attribute(&self, selector: &str, _name: &str) -> Result<Option<String>> {
        let page = self.page()?;
        if selector.contains("og:description") {
            Ok(page.og_description.clone())
        } else {
            Ok(page.meta_description.clone())
        }
    }

    async fn text_content(&self, _selector: &str) -> Result<Option<String>> {
        Ok(self.page()?.h1.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────

fn app(engine: Arc<MockEngine>) -> Router {
    router(Arc::new(AppState::with_engine(engine)))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// ── Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_urls_are_rejected_without_browser_work() {
    let engine = MockEngine::scripted(vec![]);
    let app = app(Arc::clone(&engine));

    for uri in [
        "/api/scrape",
        "/api/scrape?url=",
        "/api/scrape?url=not%20a%20url",
        "/api/scrape?url=example.com",
        "/api/scrape?url=ftp://example.com/file",
    ] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_json_eq!(body, json!({ "error": "Invalid URL" }));
    }

    assert_eq!(engine.opened(), 0);
    assert_eq!(engine.closed(), 0);
}

#[tokio::test]
async fn first_attempt_success_uses_exactly_one_session() {
    let engine = MockEngine::scripted(vec![Script::Loads(Page {
        title: Some("Example Domain".into()),
        meta_description: Some("An illustrative domain".into()),
        h1: Some("Example Domain".into()),
        ..Default::default()
    })]);
    let app = app(Arc::clone(&engine));

    let (status, body) = get_json(&app, "/api/scrape?url=https://example.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_json_eq!(
        body,
        json!({
            "title": "Example Domain",
            "metaDescription": "An illustrative domain",
            "h1": "Example Domain",
            "status": 200,
        })
    );
    assert_eq!(engine.opened(), 1);
    assert_eq!(engine.closed(), 1);
}

#[tokio::test]
async fn failed_first_attempt_is_retried_once() {
    let engine = MockEngine::scripted(vec![
        Script::NavigationFails("net::ERR_CONNECTION_REFUSED".into()),
        Script::Loads(Page {
            title: Some("Second try".into()),
            ..Default::default()
        }),
    ]);
    let app = app(Arc::clone(&engine));

    let (status, body) = get_json(&app, "/api/scrape?url=https://example.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], json!("Second try"));
    assert_eq!(engine.opened(), 2);
    assert_eq!(engine.closed(), 2);
}

#[tokio::test]
async fn exhausted_attempts_return_500_with_last_error() {
    let engine = MockEngine::scripted(vec![
        Script::NavigationFails("first error".into()),
        Script::NavigationFails("second error".into()),
    ]);
    let app = app(Arc::clone(&engine));

    let (status, body) = get_json(&app, "/api/scrape?url=https://example.com").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Scraping failed"));
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("second error"), "details: {details}");
    assert!(!details.contains("first error"), "details: {details}");
    assert_eq!(engine.opened(), 2);
    assert_eq!(engine.closed(), 2);
}

#[tokio::test(start_paused = true)]
async fn hung_navigation_hits_the_global_deadline() {
    let engine = MockEngine::scripted(vec![Script::Hangs, Script::Hangs]);
    let app = app(Arc::clone(&engine));

    let (status, body) = get_json(&app, "/api/scrape?url=https://example.com").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_json_eq!(body, json!({ "error": "Timeout" }));
    // The deadline won while an attempt was still in flight.
    assert_eq!(engine.opened(), 1);
}

#[tokio::test]
async fn missing_fields_serialize_as_null() {
    let engine = MockEngine::scripted(vec![Script::Loads(Page {
        title: Some("Example Domain".into()),
        ..Default::default()
    })]);
    let app = app(Arc::clone(&engine));

    let (status, body) = get_json(&app, "/api/scrape?url=https://example.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_json_eq!(
        body,
        json!({
            "title": "Example Domain",
            "metaDescription": null,
            "h1": null,
            "status": 200,
        })
    );
}

#[tokio::test]
async fn open_graph_description_is_used_as_fallback() {
    let engine = MockEngine::scripted(vec![Script::Loads(Page {
        og_description: Some("From Open Graph".into()),
        ..Default::default()
    })]);
    let app = app(Arc::clone(&engine));

    let (_, body) = get_json(&app, "/api/scrape?url=https://example.com").await;
    assert_eq!(body["metaDescription"], json!("From Open Graph"));
}

#[tokio::test]
async fn user_agent_override_reaches_the_engine() {
    let engine = MockEngine::scripted(vec![Script::Loads(Page::default())]);
    let app = app(Arc::clone(&engine));

    let (status, _) =
        get_json(&app, "/api/scrape?url=https://example.com&ua=sitelens-test/1.0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        engine.last_user_agent.lock().unwrap().as_deref(),
        Some("sitelens-test/1.0")
    );
}

#[tokio::test]
async fn repeated_calls_yield_identical_results() {
    let page = Page {
        title: Some("Example Domain".into()),
        h1: Some("Example Domain".into()),
        ..Default::default()
    };
    let engine = MockEngine::scripted(vec![Script::Loads(page.clone()), Script::Loads(page)]);
    let app = app(Arc::clone(&engine));

    let (first_status, first_body) = get_json(&app, "/api/scrape?url=https://example.com").await;
    let (second_status, second_body) = get_json(&app, "/api/scrape?url=https://example.com").await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_json_eq!(first_body, second_body);
    assert_eq!(engine.opened(), 2);
    assert_eq!(engine.closed(), 2);
}

#[tokio::test]
async fn liveness_and_health_routes_respond() {
    let engine = MockEngine::scripted(vec![]);
    let app = app(Arc::clone(&engine));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(engine.opened(), 0);
}
