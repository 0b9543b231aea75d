//! Query construction error types.

use thiserror::Error;

/// Result type for query construction
pub type QueryResult<T> = Result<T, QueryError>;

/// Failures while turning a validated filter set into a query plan
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    /// Window start is after window stop. Checked here rather than in the
    /// validator so format failures and range failures stay distinct.
    #[error("acquisition_start_utc {start} is exceeding acquisition_end_utc {stop}")]
    InvalidTimeRange { start: String, stop: String },

    /// A value that validation guarantees well-formed turned out not to be.
    /// Always a programming error, never a client error.
    #[error("internal query construction inconsistency: {0}")]
    Internal(String),
}
