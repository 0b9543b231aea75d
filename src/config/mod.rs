//! Catalog configuration.
//!
//! A single JSON file configures the collection allow-list, the public
//! base URL used in cursor links, the HTTP bind address, and which backing
//! store the catalog runs against. Every field has a default so an empty
//! file (or no file) boots a memory-backed catalog.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which backing store the catalog queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// PostGIS-enabled relational store
    Postgres {
        url: String,
        #[serde(default = "default_postgres_limit")]
        max_limit: u32,
    },
    /// Parquet files queried through the embedded analytical engine
    Analytics {
        parquet_path: String,
        #[serde(default = "default_analytics_limit")]
        max_limit: u32,
    },
    /// In-process store (starts empty; useful for development)
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory
    }
}

fn default_postgres_limit() -> u32 {
    50
}

fn default_analytics_limit() -> u32 {
    15
}

/// Page-size ceiling for the memory store
pub const MEMORY_MAX_LIMIT: u32 = 100;

/// Top-level catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Collection identifiers accepted by the category filter
    #[serde(default = "default_collections")]
    pub collections: Vec<String>,

    /// Base URL prefixed onto next-cursor links
    #[serde(default = "default_base_url")]
    pub public_base_url: String,

    /// Backing store selection
    #[serde(default)]
    pub store: StoreConfig,

    /// HTTP bind configuration
    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_collections() -> Vec<String> {
    vec![
        "varuna-1".to_string(),
        "varuna-2".to_string(),
        "matsya-1".to_string(),
    ]
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            collections: default_collections(),
            public_base_url: default_base_url(),
            store: StoreConfig::default(),
            http: HttpServerConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Loads configuration from a JSON file. A missing file yields the
    /// defaults; a present-but-malformed file is an error.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
