// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tessera - inspect and maintain a component registry.
//!
//! This is the binary entry point. It loads configuration, wires manifest
//! discovery behind the configured cache and runs one subcommand.

mod app;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tessera_core::{Family, TesseraError};

use crate::app::{App, InvalidateScope};

/// Tessera - inspect and maintain a component registry.
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the definitions of a family.
    List {
        family: Family,
        #[arg(long, short)]
        qualifier: Option<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show one definition.
    Show {
        family: Family,
        id: String,
        #[arg(long, short)]
        qualifier: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Scan every configured family and report discovery errors.
    Check,
    /// Drop cached definition indexes of a family.
    Invalidate {
        family: Family,
        #[arg(long, short, conflicts_with = "all")]
        qualifier: Option<String>,
        /// Drop the entries of every qualifier.
        #[arg(long)]
        all: bool,
    },
    /// Build and cache the index of every configured family.
    Warm {
        #[arg(long, short)]
        qualifier: Option<String>,
        /// Per-family deadline.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => tessera_config::load_and_validate_path(path),
        None => tessera_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tessera_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log.level);

    match run(cli.command, App::from_config(config)).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, app: Result<App, TesseraError>) -> Result<ExitCode, TesseraError> {
    let app = app?;

    match command {
        Commands::List {
            family,
            qualifier,
            json,
        } => {
            let definitions = app.list(&family, &app.qualifier(qualifier.as_deref()))?;
            if json {
                println!("{}", to_json(&definitions)?);
            } else {
                print!("{}", output::definition_table(&definitions));
            }
        }
        Commands::Show {
            family,
            id,
            qualifier,
            json,
        } => {
            let definition = app.show(&family, &id, &app.qualifier(qualifier.as_deref()))?;
            if json {
                println!("{}", to_json(&definition)?);
            } else {
                print!("{}", output::definition_detail(&definition));
            }
        }
        Commands::Check => {
            let mut failed = false;
            for report in app.check()? {
                match report.result {
                    Ok(count) => println!("ok     {} ({count} definitions)", report.family),
                    Err(e) => {
                        failed = true;
                        println!("FAILED {}: {e}", report.family);
                    }
                }
            }
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Invalidate {
            family,
            qualifier,
            all,
        } => {
            let scope = if all {
                InvalidateScope::All
            } else {
                InvalidateScope::Qualifier(app.qualifier(qualifier.as_deref()))
            };
            app.invalidate(&family, &scope)?;
            match scope {
                InvalidateScope::All => println!("invalidated {family} (all qualifiers)"),
                InvalidateScope::Qualifier(q) => println!("invalidated {family} ({q})"),
            }
        }
        Commands::Warm {
            qualifier,
            timeout_secs,
        } => {
            let qualifier = app.qualifier(qualifier.as_deref());
            let warmed = app
                .warm(&qualifier, Duration::from_secs(timeout_secs))
                .await?;
            for (family, count) in warmed {
                println!("warmed {family} ({qualifier}): {count} definitions");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, TesseraError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| TesseraError::Internal(format!("failed to encode output: {e}")))
}

/// Install the global subscriber. `TESSERA_LOG`, then `RUST_LOG`, override
/// the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("TESSERA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("tessera={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
