//! HTTP server.
//!
//! Combines the health and catalog routers under one axum service with
//! CORS from configuration.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::observability::{events, Logger};

use super::catalog_routes::{catalog_routes, health_routes, CatalogState};
use super::config::HttpServerConfig;

/// The catalog's HTTP front end
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Builds the combined router for the given catalog state.
    pub fn new(config: HttpServerConfig, state: Arc<CatalogState>) -> Self {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            use tower_http::cors::AllowOrigin;
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let router = Router::new()
            .merge(health_routes())
            .merge(catalog_routes(state))
            .layer(cors);

        Self { config, router }
    }

    /// The configured socket address.
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// The router (for testing).
    pub fn router(self) -> Router {
        self.router
    }

    /// Binds and serves until the process exits.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{}", e)))?;

        Logger::info(
            events::SERVER_STARTED,
            &[("addr", &addr.to_string())],
        );

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
