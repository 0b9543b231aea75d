//! Materialization error types.

use thiserror::Error;

use crate::geometry::GeometryError;

/// Result type for row materialization
pub type MaterializeResult<T> = Result<T, MaterializeError>;

/// Failures while normalizing raw store rows. Both variants are fatal for
/// the request: a page is either mapped completely or not at all.
#[derive(Debug, Clone, Error)]
pub enum MaterializeError {
    /// The store returned an unexpected column shape
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A stored footprint failed to decode
    #[error("stored geometry undecodable: {0}")]
    Geometry(#[from] GeometryError),
}
