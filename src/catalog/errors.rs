//! Catalog service error taxonomy.
//!
//! One unified error for the service seam. Validation failures are client
//! errors raised before any store call; store and materialization failures
//! are server errors. HTTP status codes are decided here but the HTTP
//! types live in the routing layer, keeping the core framework-free.

use thiserror::Error;

use crate::filter::FilterError;
use crate::materialize::MaterializeError;
use crate::query::QueryError;
use crate::store::StoreError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failures surfaced by the catalog service
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Parameter validation rejected the request
    #[error("{0}")]
    Filter(#[from] FilterError),

    /// Query construction rejected the request or hit an internal bug
    #[error("{0}")]
    Query(#[from] QueryError),

    /// Query succeeded but matched nothing
    #[error("no data found matching the search criteria")]
    NoResults,

    /// The backing store failed; not retried
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The store returned rows the catalog cannot map
    #[error("{0}")]
    Materialize(#[from] MaterializeError),
}

impl CatalogError {
    /// HTTP status code this failure maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::Filter(err) => match err {
                FilterError::InvalidCategory(_) => 400,
                FilterError::LimitOutOfRange { .. } => 400,
                FilterError::InvalidNum => 400,
                FilterError::InvalidBbox(_)
                | FilterError::InvalidGeometry(_)
                | FilterError::InvalidTimeFormat(_)
                | FilterError::IncompleteTimeWindow => 422,
            },
            CatalogError::Query(err) => match err {
                QueryError::InvalidTimeRange { .. } => 400,
                QueryError::Internal(_) => 500,
            },
            CatalogError::NoResults => 404,
            CatalogError::Store(_) => 502,
            CatalogError::Materialize(_) => 500,
        }
    }

    /// True for rejections the client can fix.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CatalogError::Filter(FilterError::InvalidCategory("x".into())).status_code(),
            400
        );
        assert_eq!(
            CatalogError::Filter(FilterError::InvalidBbox("x".into())).status_code(),
            422
        );
        assert_eq!(
            CatalogError::Query(QueryError::InvalidTimeRange {
                start: "a".into(),
                stop: "b".into()
            })
            .status_code(),
            400
        );
        assert_eq!(CatalogError::NoResults.status_code(), 404);
        assert_eq!(
            CatalogError::Store(StoreError::Unavailable("down".into())).status_code(),
            502
        );
        assert_eq!(
            CatalogError::Materialize(MaterializeError::SchemaMismatch("x".into()))
                .status_code(),
            500
        );
    }

    #[test]
    fn test_client_error_partition() {
        assert!(CatalogError::Filter(FilterError::InvalidNum).is_client_error());
        assert!(CatalogError::NoResults.is_client_error());
        assert!(!CatalogError::Store(StoreError::Unavailable("down".into())).is_client_error());
    }
}
