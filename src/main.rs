// src/main.rs

//! The entry point of the `json_data` command-line tool.

use anyhow::{Context, Result};
use clap::Parser;
use instrument_json::cli::{self, Cli, Request};
use instrument_json::config::Config;
use instrument_json::core::migrations::migrate_completion_flag;
use instrument_json::core::{MutationToolkit, SqliteStore, ToolkitError};
use instrument_json::logging;
use std::path::Path;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(ToolkitError::Metadata(_)) = e.downcast_ref::<ToolkitError>() {
                print!("{}", cli::metadata_error_banner());
            }
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.database = db.display().to_string();
    }
    logging::init(&config.log_level);

    let store = SqliteStore::open(Path::new(&config.database), &config.flag_table)
        .with_context(|| format!("Failed to open database '{}'", config.database))?;
    let as_json = cli.json;

    match cli.command.into_request()? {
        Request::MigrateCompletionFlag => {
            let report = migrate_completion_flag(&store)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Scanned {} records: {} flags set, {} documents updated.",
                    report.records_scanned, report.flags_set, report.documents_updated
                );
            }
        }
        Request::Toolkit { instrument, action } => {
            let toolkit = MutationToolkit::new(&store, instrument.as_str())?;
            let outcome = action.execute(&toolkit)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", cli::render_outcome(&action, &instrument, &outcome)?);
            }
        }
    }

    Ok(())
}
