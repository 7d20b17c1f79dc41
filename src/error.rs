//! Error taxonomy for the scrape pipeline.
//!
//! Field-level extraction misses never appear here — they are absorbed by
//! the extraction worker and become `null` fields. Everything that can end
//! a request does, and the REST layer is the single point that maps these
//! to HTTP status codes. The retry controller does not classify: every
//! attempt-level failure is retried identically.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The target URL is missing, relative, or not http/https.
    /// Rejected before any browser resource is touched.
    #[error("invalid URL")]
    InvalidUrl,

    /// The engine failed to load the target within the per-attempt
    /// timeout, or reported a load/connection failure.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The global wall-clock budget elapsed before any attempt produced
    /// a definitive outcome.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Any other failure surfaced by the browser engine — launch errors,
    /// lost CDP connections.
    #[error("browser engine error: {0}")]
    Engine(String),
}
