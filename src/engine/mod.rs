//! Browser-engine abstraction.
//!
//! Defines the `Engine` and `BrowserSession` traits that abstract over the
//! automation engine (currently headless Chromium via chromiumoxide). A
//! session is exclusively owned by one scrape attempt: opened at the start,
//! closed on every exit path, never shared across attempts or requests.
//! Dropping an unclosed session must still release the underlying engine
//! process, so a deadline-cancelled attempt cannot leak it.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A browser-automation engine that can open isolated sessions.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Open a fresh session: one engine instance, one isolated browsing
    /// context, one page. `user_agent` overrides the engine default for
    /// this session only.
    async fn open_session(&self, user_agent: Option<&str>) -> Result<Box<dyn BrowserSession>>;
}

/// One isolated browsing session scoped to a single scrape attempt.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to `url`, waiting for the page to settle, bounded by
    /// `timeout`. An elapsed timeout is a navigation failure.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// The document title. `None` when the page has no (non-empty) title.
    async fn title(&self) -> Result<Option<String>>;

    /// The value of attribute `name` on the first element matching
    /// `selector`, or `None` when no element matches or the attribute is
    /// absent or empty.
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// The trimmed text content of the first element matching `selector`,
    /// or `None` when no element matches or the text trims to empty.
    async fn text_content(&self, selector: &str) -> Result<Option<String>>;

    /// Tear down the session and release the engine instance.
    async fn close(self: Box<Self>) -> Result<()>;
}
