//! Extraction worker: one attempt = one exclusively-owned browser session.
//!
//! The session is closed on every exit path — success, navigation failure,
//! and (via drop) deadline cancellation. Field extractions are independent:
//! a selector that matches nothing or a query that errors becomes a `None`
//! field, never an attempt failure.

use crate::engine::{BrowserSession, Engine};
use crate::error::ScrapeError;
use crate::scrape::{ScrapeRequest, ScrapeResult, NAV_TIMEOUT};
use tracing::{debug, warn};

const META_DESCRIPTION: &str = r#"meta[name="description"]"#;
const OG_DESCRIPTION: &str = r#"meta[property="og:description"]"#;
const FIRST_HEADING: &str = "h1";

/// Perform one scrape attempt against a fresh browser session.
pub async fn attempt(
    engine: &dyn Engine,
    request: &ScrapeRequest,
) -> Result<ScrapeResult, ScrapeError> {
    let mut session = engine
        .open_session(request.user_agent.as_deref())
        .await
        .map_err(|e| ScrapeError::Engine(format!("{e:#}")))?;

    let result = extract(session.as_mut(), request.url.as_str()).await;

    if let Err(e) = session.close().await {
        warn!("failed to close browser session: {e:#}");
    }

    result
}

async fn extract(
    session: &mut dyn BrowserSession,
    url: &str,
) -> Result<ScrapeResult, ScrapeError> {
    session
        .navigate(url, NAV_TIMEOUT)
        .await
        .map_err(|e| ScrapeError::Navigation(format!("{e:#}")))?;

    let title = absorb("title", session.title().await);

    let meta_description = match absorb(
        "meta_description",
        session.attribute(META_DESCRIPTION, "content").await,
    ) {
        Some(v) => Some(v),
        None => absorb(
            "og_description",
            session.attribute(OG_DESCRIPTION, "content").await,
        ),
    };

    let h1 = absorb("h1", session.text_content(FIRST_HEADING).await);

    Ok(ScrapeResult {
        title,
        meta_description,
        h1,
        status: 200,
    })
}

/// Field extractions never fail the attempt: a query error is logged and
/// recorded as an absent field.
fn absorb(field: &str, result: anyhow::Result<Option<String>>) -> Option<String> {
    match result {
        Ok(value) => value,
        Err(e) => {
            debug!(field, "extraction query failed: {e:#}");
            None
        }
    }
}
