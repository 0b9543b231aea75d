//! Catalog HTTP routes.
//!
//! Thin translation between the wire and the catalog service: query-string
//! parameters map onto `RawParams`, the original request URI is rebuilt
//! against the configured public base URL so cursor links point where
//! clients can actually follow them, and service errors pass through the
//! shared envelope.

use std::sync::Arc;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use url::Url;

use crate::catalog::{CatalogError, CatalogService, PageResult};
use crate::filter::RawParams;
use crate::query::QueryError;

use super::errors::ApiError;

/// State shared by all catalog routes
pub struct CatalogState {
    pub service: CatalogService,
    pub public_base_url: String,
}

/// Query-string parameters accepted by the listing routes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub coordinates: Option<String>,
    pub bbox: Option<String>,
    pub start_time: Option<String>,
    pub stop_time: Option<String>,
    #[serde(rename = "collectionId")]
    pub collection_id: Option<String>,
    pub num: Option<u32>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

impl ListQuery {
    fn into_raw(self) -> RawParams {
        RawParams {
            coordinates: self.coordinates,
            bbox: self.bbox,
            start_time: self.start_time,
            stop_time: self.stop_time,
            collection: self.collection_id,
            num: self.num,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Routes rooted at the catalog state
pub fn catalog_routes(state: Arc<CatalogState>) -> Router {
    Router::new()
        .route("/search", get(search_items))
        .route(
            "/v1/collections/:collectionId/items",
            get(list_collection_items),
        )
        .route(
            "/v1/collections/:collectionId/items/:itemId",
            get(get_collection_item),
        )
        .with_state(state)
}

/// Liveness routes
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "geostac" }))
}

async fn search_items(
    State(state): State<Arc<CatalogState>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ListQuery>,
) -> Result<Json<PageResult>, ApiError> {
    let url = request_url(&state.public_base_url, &uri)?;
    let page = state.service.search(&params.into_raw(), &url).await?;
    Ok(Json(page))
}

async fn list_collection_items(
    State(state): State<Arc<CatalogState>>,
    OriginalUri(uri): OriginalUri,
    Path(collection_id): Path<String>,
    Query(params): Query<ListQuery>,
) -> Result<Json<PageResult>, ApiError> {
    let url = request_url(&state.public_base_url, &uri)?;
    let page = state
        .service
        .list_items(&collection_id, &params.into_raw(), &url)
        .await?;
    Ok(Json(page))
}

async fn get_collection_item(
    State(state): State<Arc<CatalogState>>,
    Path((collection_id, item_id)): Path<(String, String)>,
) -> Result<Json<PageResult>, ApiError> {
    let page = state.service.get_item(&collection_id, &item_id).await?;
    Ok(Json(page))
}

/// Rebuilds the absolute request URL the cursor planner works from.
fn request_url(base: &str, uri: &axum::http::Uri) -> Result<Url, ApiError> {
    Url::parse(&format!("{}{}", base.trim_end_matches('/'), uri)).map_err(|e| {
        ApiError(CatalogError::Query(QueryError::Internal(format!(
            "cannot reconstruct request URL: {}",
            e
        ))))
    })
}
