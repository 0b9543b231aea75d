//! HTTP error envelope.
//!
//! Wraps the service error taxonomy for axum; status codes come from the
//! taxonomy itself so the routing layer adds nothing but the JSON shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::catalog::CatalogError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: u16,
}

/// axum-facing wrapper around `CatalogError`
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.status_code();
        let status =
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ErrorResponse {
            detail: self.0.to_string(),
            code,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterError;

    #[test]
    fn test_error_response_shape() {
        let err = ApiError(CatalogError::Filter(FilterError::InvalidCategory(
            "landsat-9".into(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError(CatalogError::NoResults);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
