//! Filter validation error types.
//!
//! Every variant is a client-side rejection: validation runs before any
//! store call, so none of these ever follow a partially executed query.

use thiserror::Error;

/// Result type for filter validation
pub type FilterResult<T> = Result<T, FilterError>;

/// Rejections produced while validating raw request parameters
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FilterError {
    /// Bounding box was not 4/6 comma-separated numbers with ordered bounds
    #[error("invalid bounding box: {0}")]
    InvalidBbox(String),

    /// Spatial filter was not valid well-known text
    #[error("invalid coordinates; must be in WKT format: {0}")]
    InvalidGeometry(String),

    /// Time parameter did not parse as ISO-8601
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// Only one of start_time / stop_time was supplied
    #[error("start_time and stop_time must be supplied together")]
    IncompleteTimeWindow,

    /// Collection id is not in the configured allow-list
    #[error("invalid collection id: {0}")]
    InvalidCategory(String),

    /// Page size outside the store's accepted range
    #[error("limit {given} out of range 1..={max}")]
    LimitOutOfRange { given: u32, max: u32 },

    /// Total cap must be at least one item
    #[error("num must be at least 1")]
    InvalidNum,
}
