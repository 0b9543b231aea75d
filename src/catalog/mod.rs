//! Catalog service.
//!
//! The shared request pipeline behind every route: validate filters, build
//! one plan, execute it against the configured store, materialize and map
//! the rows, then plan the next cursor from the same effective limit the
//! plan recorded. One implementation, parameterized by the store's column
//! map, replaces the per-route copies of this logic.

mod errors;
mod product;
mod response;

pub use errors::{CatalogError, CatalogResult};
pub use product::{map_product, GeometryJson, Product};
pub use response::PageResult;

use std::sync::Arc;
use std::time::Instant;

use url::Url;
use uuid::Uuid;

use crate::filter::{FilterValidator, RawParams};
use crate::materialize::Materializer;
use crate::observability::{events, Logger};
use crate::page::{self, PageWindow};
use crate::query::QueryBuilder;
use crate::store::StoreExecutor;

/// The catalog's service facade: `search`, `list_items`, `get_item`.
///
/// Holds no per-request state; every call validates, plans, executes, and
/// maps independently. The store connection itself is acquired inside the
/// executor for the duration of one call.
pub struct CatalogService {
    store: Arc<dyn StoreExecutor>,
    collections: Vec<String>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn StoreExecutor>, collections: Vec<String>) -> Self {
        Self { store, collections }
    }

    /// The configured collection allow-list.
    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    /// Cross-collection search.
    pub async fn search(
        &self,
        raw: &RawParams,
        request_url: &Url,
    ) -> CatalogResult<PageResult> {
        self.run_listing(raw, request_url).await
    }

    /// Collection-scoped listing. The path parameter wins over any
    /// collection filter in the query string.
    pub async fn list_items(
        &self,
        collection: &str,
        raw: &RawParams,
        request_url: &Url,
    ) -> CatalogResult<PageResult> {
        let scoped = RawParams {
            collection: Some(collection.to_string()),
            ..raw.clone()
        };
        self.run_listing(&scoped, request_url).await
    }

    /// Single-item lookup by composite key. Never carries a next cursor.
    pub async fn get_item(&self, collection: &str, item_id: &str) -> CatalogResult<PageResult> {
        let request_id = Uuid::new_v4().to_string();

        if !self.collections.iter().any(|c| c == collection) {
            self.reject(
                &request_id,
                &CatalogError::Filter(crate::filter::FilterError::InvalidCategory(
                    collection.to_string(),
                )),
            );
            return Err(crate::filter::FilterError::InvalidCategory(collection.to_string()).into());
        }

        let started = Instant::now();
        let columns = self.store.columns();
        let plan = QueryBuilder::new(columns).build_item_lookup(collection, item_id);

        let rows = match self.store.execute(&plan).await {
            Ok(rows) => rows,
            Err(err) => {
                self.store_error(&request_id, &err);
                return Err(err.into());
            }
        };

        let items = Materializer::new(columns).materialize(&rows)?;
        if items.is_empty() {
            return Err(CatalogError::NoResults);
        }

        let products = items
            .iter()
            .map(map_product)
            .collect::<Result<Vec<_>, _>>()?;

        Logger::info(
            events::QUERY_EXECUTED,
            &[
                ("request_id", request_id.as_str()),
                ("collection", collection),
                ("item_id", item_id),
                ("rows", &rows.len().to_string()),
                ("duration_ms", &started.elapsed().as_millis().to_string()),
            ],
        );

        Ok(PageResult::new(products, None))
    }

    /// Shared listing pipeline for `search` and `list_items`.
    async fn run_listing(
        &self,
        raw: &RawParams,
        request_url: &Url,
    ) -> CatalogResult<PageResult> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let validator = FilterValidator::new(&self.collections, self.store.max_limit());
        let filters = match validator.validate(raw) {
            Ok(filters) => filters,
            Err(err) => {
                let wrapped = CatalogError::Filter(err);
                self.reject(&request_id, &wrapped);
                return Err(wrapped);
            }
        };

        let columns = self.store.columns();
        let plan = match QueryBuilder::new(columns).build(&filters) {
            Ok(plan) => plan,
            Err(err) => {
                let wrapped = CatalogError::Query(err);
                if wrapped.is_client_error() {
                    self.reject(&request_id, &wrapped);
                }
                return Err(wrapped);
            }
        };

        let rows = match self.store.execute(&plan).await {
            Ok(rows) => rows,
            Err(err) => {
                self.store_error(&request_id, &err);
                return Err(err.into());
            }
        };

        Logger::info(
            events::QUERY_EXECUTED,
            &[
                ("request_id", request_id.as_str()),
                ("collection", filters.collection.as_deref().unwrap_or("*")),
                ("rows", &rows.len().to_string()),
                ("effective_limit", &plan.effective_limit.to_string()),
                ("offset", &plan.offset.to_string()),
                ("duration_ms", &started.elapsed().as_millis().to_string()),
            ],
        );

        let items = Materializer::new(columns).materialize(&rows)?;
        if items.is_empty() {
            return Err(CatalogError::NoResults);
        }

        let products = items
            .iter()
            .map(map_product)
            .collect::<Result<Vec<_>, _>>()?;

        let window = PageWindow {
            effective_limit: plan.effective_limit,
            offset: plan.offset,
            num: filters.num,
            returned: products.len(),
        };
        let next = page::next_url(request_url, &window);

        Logger::info(
            events::PAGE_SERVED,
            &[
                ("request_id", request_id.as_str()),
                ("count", &products.len().to_string()),
                ("has_next", if next.is_some() { "true" } else { "false" }),
            ],
        );

        Ok(PageResult::new(products, next))
    }

    fn reject(&self, request_id: &str, err: &CatalogError) {
        Logger::warn(
            events::REQUEST_REJECTED,
            &[
                ("request_id", request_id),
                ("status", &err.status_code().to_string()),
                ("detail", &err.to_string()),
            ],
        );
    }

    fn store_error(&self, request_id: &str, err: &crate::store::StoreError) {
        Logger::error(
            events::STORE_ERROR,
            &[("request_id", request_id), ("detail", &err.to_string())],
        );
    }
}
