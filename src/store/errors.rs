//! Backing-store error types.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by a backing store. The core never retries these;
/// they propagate to the caller as-is.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Connection or query execution failed
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
