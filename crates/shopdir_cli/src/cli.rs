//! Command-line surface and runtime configuration.
//!
//! # Responsibility
//! - Declare global options (database path, logging) and one subcommand per
//!   directory operation.
//! - Resolve configuration from flags, environment and defaults.

use clap::{Args, Parser, Subcommand};
use shopdir_core::{default_log_level, LoggingConfig, ShopDraft, ShopId};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "shops.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "shopdir")]
#[command(version)]
#[command(about = "Manage a directory of shop records", long_about = None)]
pub struct Cli {
    /// SQLite database file (defaults to the system temp directory)
    #[arg(long, env = "SHOPDIR_DB_PATH", global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
    /// Log level: trace, debug, info, warn or error
    #[arg(long, env = "SHOPDIR_LOG_LEVEL", global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
    /// Absolute directory for rotating log files (logs go to stderr when unset)
    #[arg(long, env = "SHOPDIR_LOG_DIR", global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
    }

    pub fn logging_config(&self) -> LoggingConfig {
        let level = self
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        match self.log_dir.clone() {
            Some(dir) => LoggingConfig::files(level, dir),
            None => LoggingConfig::stderr(level),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List every shop
    List,
    /// Show one shop
    Get {
        /// Shop ID
        id: ShopId,
    },
    /// Create a shop
    Create(ShopArgs),
    /// Replace the name, address, phone and email of a shop
    Update {
        /// Shop ID
        id: ShopId,
        #[command(flatten)]
        shop: ShopArgs,
    },
    /// Delete a shop
    Delete {
        /// Shop ID
        id: ShopId,
    },
    /// Case-insensitive search over name and address
    Search {
        /// Text to look for; empty matches every shop
        #[arg(default_value = "", allow_hyphen_values = true)]
        term: String,
    },
    /// Print the number of shops
    Count,
}

/// Mutable shop fields. Missing required values surface as validation
/// errors rather than argument errors.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ShopArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

impl From<ShopArgs> for ShopDraft {
    fn from(args: ShopArgs) -> Self {
        Self {
            id: None,
            name: args.name,
            address: args.address,
            phone: args.phone,
            email: args.email,
        }
    }
}
