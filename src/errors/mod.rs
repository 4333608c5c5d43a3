use std::time::Duration;

use thiserror::Error;

/// A stored rating field that cannot be used for aggregation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("record is not an object")]
    NotAnObject,

    #[error("field `{0}` is missing")]
    Missing(&'static str),

    #[error("field `{field}` is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("field `{0}` is not a finite number")]
    NotFinite(&'static str),
}

/// Failure to load the record set from the remote store
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    #[error("backend request failed: {0:#}")]
    Backend(anyhow::Error),
}

impl FetchError {
    /// Whether the UI should offer a manual retry
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("this device has already voted")]
    AlreadyVoted,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
