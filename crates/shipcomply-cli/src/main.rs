//! # shipcomply CLI entry point
//!
//! Parses arguments, loads configuration, initializes tracing and dispatches
//! to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shipcomply_cli::catalog::{run_import, run_reset, run_rules, run_seed, ImportArgs, RulesArgs};
use shipcomply_cli::config::ShipcomplyConfig;
use shipcomply_cli::country::{run_country, CountryArgs};
use shipcomply_cli::validate::{run_validate, ValidateArgs};

/// Shipment compliance toolchain.
///
/// Validates shipment fields against the rule catalog and screens
/// international shipments for missing customs data, restricted
/// destinations and restricted contents.
#[derive(Parser, Debug)]
#[command(name = "shipcomply", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install the default rule catalog into an empty store.
    Seed,

    /// Clear the store and reinstall the default rule catalog.
    Reset,

    /// Validate a shipment file and run cross-border checks.
    Validate(ValidateArgs),

    /// List active validation rules.
    Rules(RulesArgs),

    /// Import reference data (required fields, country requirements,
    /// restricted items and destinations, documentation).
    Import(ImportArgs),

    /// Normalize a country name or code.
    Country(CountryArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = match ShipcomplyConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(config = ?config, "configuration loaded");

    let result = match &cli.command {
        Commands::Seed => run_seed(&config).await,
        Commands::Reset => run_reset(&config).await,
        Commands::Validate(args) => run_validate(args, &config).await,
        Commands::Rules(args) => run_rules(args, &config).await,
        Commands::Import(args) => run_import(args, &config).await,
        Commands::Country(args) => run_country(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8, json: bool) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
