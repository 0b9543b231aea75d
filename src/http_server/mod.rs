//! HTTP surface for the catalog.
//!
//! Routing and wire translation only; every decision about filters,
//! pagination, and errors lives below the service seam.

mod catalog_routes;
mod config;
mod errors;
mod server;

pub use catalog_routes::{catalog_routes, health_routes, CatalogState, ListQuery};
pub use config::HttpServerConfig;
pub use errors::{ApiError, ErrorResponse};
pub use server::HttpServer;
