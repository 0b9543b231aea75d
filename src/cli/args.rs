//! CLI argument definitions using clap.
//!
//! Commands:
//! - geostac serve --config <path>
//! - geostac check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// geostac - A filterable, paginated geospatial metadata catalog API
#[derive(Parser, Debug)]
#[command(name = "geostac")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the catalog HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./geostac.json")]
        config: PathBuf,
    },

    /// Load and print the effective configuration, then exit
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./geostac.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
