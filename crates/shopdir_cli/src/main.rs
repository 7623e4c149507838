//! Command-line front end for the shop directory.
//!
//! # Responsibility
//! - Resolve configuration, initialize logging and open the database.
//! - Run one directory operation and print its JSON envelope to stdout.
//! - Exit with a status-specific code (0 ok, 1 store error, 2 not found,
//!   3 validation failure).

mod cli;
mod commands;
mod envelope;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use envelope::Status;
use log::info;
use shopdir_core::db::open_db;
use shopdir_core::{init_logging, ShopDirectory, SqliteShopRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok((status, body)) => {
            println!("{body}");
            status.exit_code()
        }
        Err(err) => {
            eprintln!("shopdir: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(Status, String)> {
    init_logging(&cli.logging_config()).context("failed to initialize logging")?;

    let db_path = cli.db_path();
    info!(
        "event=cli_start module=cli status=ok version={} db_path={}",
        shopdir_core::core_version(),
        db_path.display()
    );

    let conn = open_db(&db_path)?;
    let repo = SqliteShopRepository::try_new(&conn).context("database is not ready")?;
    let directory = ShopDirectory::new(repo);

    let response = commands::execute(&directory, cli.command);
    let body = serde_json::to_string_pretty(&response.envelope)
        .context("failed to encode response")?;
    Ok((response.status, body))
}
