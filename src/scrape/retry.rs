//! Retry controller: a fixed, sequential attempt budget.
//!
//! Every attempt-level failure is retryable — a navigation timeout and any
//! other engine error are retried identically. The first success returns
//! immediately; once the budget is exhausted only the last failure
//! propagates.

use crate::engine::Engine;
use crate::error::ScrapeError;
use crate::scrape::{worker, ScrapeRequest, ScrapeResult, ATTEMPT_BUDGET};
use tracing::{info, warn};

/// Run the extraction worker up to [`ATTEMPT_BUDGET`] times. Attempts are
/// strictly sequential: attempt N+1 starts only after attempt N's outcome
/// is observed. No backoff between attempts.
pub async fn run(
    engine: &dyn Engine,
    request: &ScrapeRequest,
) -> Result<ScrapeResult, ScrapeError> {
    let mut last_error = None;

    for attempt in 1..=ATTEMPT_BUDGET {
        match worker::attempt(engine, request).await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempt, url = %request.url, "scrape succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                warn!(attempt, url = %request.url, error = %e, "scrape attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| ScrapeError::Engine("attempt budget was empty".to_string())))
}
