//! Global deadline guard.
//!
//! Races a unit of work against a wall-clock deadline. When the deadline
//! fires first the work future is dropped, which cancels the in-flight
//! attempt at its next suspension point; the abandoned session's drop path
//! releases the engine process. Dropping the whole future also means no
//! further attempt can start after the deadline.

use crate::error::ScrapeError;
use std::future::Future;
use std::time::Duration;

/// Resolve with whichever settles first: the work's outcome or
/// [`ScrapeError::DeadlineExceeded`] on expiry.
pub async fn bounded<T, F>(work: F, deadline: Duration) -> Result<T, ScrapeError>
where
    F: Future<Output = Result<T, ScrapeError>>,
{
    match tokio::time::timeout(deadline, work).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ScrapeError::DeadlineExceeded),
    }
}
