//! The scrape pipeline: one bounded, retrying, cancelable run of an
//! unreliable external operation (page navigation + DOM extraction).
//!
//! Layering, innermost first: [`worker`] performs one attempt on one
//! browser session, [`retry`] sequences a fixed attempt budget, and
//! [`deadline`] races the whole run against the global wall-clock budget.

pub mod deadline;
pub mod retry;
pub mod worker;

use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Per-attempt navigation timeout. Strictly shorter than
/// [`GLOBAL_DEADLINE`] so a retry usually fits inside the budget.
pub const NAV_TIMEOUT: Duration = Duration::from_secs(15);

/// Global wall-clock budget for one request.
pub const GLOBAL_DEADLINE: Duration = Duration::from_secs(20);

/// Fixed attempt budget: one initial try plus one retry, no backoff.
pub const ATTEMPT_BUDGET: u32 = 2;

/// A validated scrape request, built once per incoming call.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: Url,
    pub user_agent: Option<String>,
}

impl ScrapeRequest {
    /// Validate the raw target URL: it must parse as an absolute URL with
    /// an http or https scheme. Anything else is rejected before any
    /// browser resource is acquired.
    pub fn parse(raw_url: &str, user_agent: Option<String>) -> Result<Self, ScrapeError> {
        let url = Url::parse(raw_url).map_err(|_| ScrapeError::InvalidUrl)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScrapeError::InvalidUrl);
        }
        Ok(Self { url, user_agent })
    }
}

/// The extracted page metadata. Each field is extracted independently;
/// a missing field is `None`, never an attempt failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1: Option<String>,
    /// Fixed at 200 on the success path.
    pub status: u16,
}
