use std::time::Duration;

use thiserror::Error;

/// Failure taxonomy for the location engine.
///
/// `StaleHandle` and `EmptyMatch` represent races with document mutation, not
/// genuine errors; the poller swallows them per tick. Everything else aborts
/// the current poll and surfaces to the caller unchanged.
#[derive(Debug, Error)]
pub enum LocateError {
    /// An element handle outlived a re-render of the document.
    #[error("stale element handle: {0}")]
    StaleHandle(String),

    /// A query matched nothing this tick.
    #[error("query matched nothing: {0}")]
    EmptyMatch(String),

    /// Nothing matched within the timeout and the locator demanded a failure.
    #[error("no element found for {description} within {timeout:?}")]
    NotFound {
        description: String,
        timeout: Duration,
    },

    /// An element that was expected to disappear is still present.
    #[error("element still present after {timeout:?}: {description}")]
    StillPresent {
        description: String,
        timeout: Duration,
    },

    /// Malformed locator: empty qualifier set, missing index, bad raw query.
    #[error("invalid locator configuration: {0}")]
    InvalidConfiguration(String),

    /// Transport or backend failure underneath the document provider.
    #[error("document provider failure: {0}")]
    Backend(#[from] anyhow::Error),
}

impl LocateError {
    /// Whether the poller may treat this failure as "condition not yet met"
    /// and try again next tick.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LocateError::StaleHandle(_) | LocateError::EmptyMatch(_)
        )
    }
}
