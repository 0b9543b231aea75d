//! CLI for the catalog.
//!
//! `main` delegates everything here: argument parsing, configuration
//! loading, store construction, and the serve loop.

mod args;
mod errors;

pub use args::{Cli, Command};
pub use errors::{CliError, CliResult};

use std::path::Path;
use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::config::{CatalogConfig, StoreConfig, MEMORY_MAX_LIMIT};
use crate::http_server::{CatalogState, HttpServer};
use crate::query::ColumnMap;
use crate::store::{AnalyticsStore, MemoryStore, PostgresStore, StoreExecutor};

/// Parses arguments and dispatches to the selected command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Serve { config } => serve(&config),
        Command::CheckConfig { config } => check_config(&config),
    }
}

fn check_config(path: &Path) -> CliResult<()> {
    let config = CatalogConfig::load(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn serve(path: &Path) -> CliResult<()> {
    let config = CatalogConfig::load(path)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let store = build_store(&config).await?;
        let state = Arc::new(CatalogState {
            service: CatalogService::new(store, config.collections.clone()),
            public_base_url: config.public_base_url.clone(),
        });
        let server = HttpServer::new(config.http.clone(), state);
        server.start().await?;
        Ok(())
    })
}

async fn build_store(config: &CatalogConfig) -> CliResult<Arc<dyn StoreExecutor>> {
    let store: Arc<dyn StoreExecutor> = match &config.store {
        StoreConfig::Postgres { url, max_limit } => Arc::new(PostgresStore::connect(
            url,
            ColumnMap::relational_default(),
            *max_limit,
        )?),
        StoreConfig::Analytics {
            parquet_path,
            max_limit,
        } => Arc::new(
            AnalyticsStore::open(parquet_path, ColumnMap::analytical_default(), *max_limit)
                .await?,
        ),
        StoreConfig::Memory => Arc::new(MemoryStore::new(
            ColumnMap::identity("items"),
            MEMORY_MAX_LIMIT,
        )),
    };
    Ok(store)
}
