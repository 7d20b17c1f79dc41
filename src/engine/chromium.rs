//! Chromium-based engine using chromiumoxide.
//!
//! Each session launches its own headless Chromium process with one page,
//! so concurrent requests never share browser state. chromiumoxide kills
//! the child process when the `Browser` is dropped, which is what releases
//! the engine when a deadline cancels an in-flight attempt.

use super::{BrowserSession, Engine};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SITELENS_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SITELENS_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser", "chrome"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 3. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Engine that launches one headless Chromium per session.
pub struct ChromiumEngine {
    executable: PathBuf,
}

impl ChromiumEngine {
    /// Create a new engine, resolving the Chromium executable up front so
    /// a missing browser is reported once instead of per attempt.
    pub fn new() -> Result<Self> {
        let executable = find_chromium()
            .context("Chromium not found. Set SITELENS_CHROMIUM_PATH or install Chrome.")?;
        debug!("using chromium executable {}", executable.display());
        Ok(Self { executable })
    }
}

#[async_trait]
impl Engine for ChromiumEngine {
    async fn open_session(&self, user_agent: Option<&str>) -> Result<Box<dyn BrowserSession>> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.executable)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");

        // Per-session override; the whole browser process is scoped to
        // this session, so a launch arg is an isolated override.
        if let Some(ua) = user_agent {
            builder = builder.arg(format!("--user-agent={ua}"));
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to create page")?;

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
        }))
    }
}

/// One headless Chromium instance with a single page.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: tokio::task::JoinHandle<()>,
}

impl ChromiumSession {
    /// Evaluate a JS expression and deserialize its (possibly null) result.
    async fn eval_optional(&self, script: String) -> Result<Option<String>> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS evaluation failed")?;
        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let nav = async {
            self.page.goto(url).await?;
            // Settle after the initial commit (redirects, late loads).
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(timeout, nav).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn title(&self) -> Result<Option<String>> {
        self.eval_optional(
            "(() => { const t = document.title.trim(); return t.length ? t : null; })()"
                .to_string(),
        )
        .await
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return null; \
             const v = el.getAttribute({name}); \
             return v && v.trim().length ? v.trim() : null; }})()",
            sel = js_string(selector),
            name = js_string(name),
        );
        self.eval_optional(script).await
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el || el.textContent === null) return null; \
             const t = el.textContent.trim(); \
             return t.length ? t : null; }})()",
            sel = js_string(selector),
        );
        self.eval_optional(script).await
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        let _ = self.page.clone().close().await;
        if let Err(e) = self.browser.close().await {
            debug!("browser close failed: {e}");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }
}

/// Encode a string as a JS string literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
