//! Cache error types

use thiserror::Error;

/// Failure of a result store backend
///
/// Callers treat every variant as "cache unavailable": a failed lookup is a
/// miss and a failed store is dropped.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend cannot be reached
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    /// Check if retrying the same operation might succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
