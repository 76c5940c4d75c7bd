//! printrate CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Store error

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use printrate_core::PricingError;
use printrate_store::StoreError;

mod commands;
mod config;

use commands::{Cli, Commands};
use config::CliConfig;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const STORE_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "printrate=debug" } else { "printrate=info" };
    let mut filter = EnvFilter::from_default_env();
    for directive in [level, "warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    debug!("Using store {}", config.store_path.display());

    match cli.command {
        Commands::Quote(args) => commands::quote::execute(args, &config).await,
        Commands::Settings(args) => commands::settings::execute(args, &config).await,
        Commands::Payee(args) => commands::payee::execute(args, &config).await,
        Commands::PayLink(args) => commands::pay_link::execute(args, &config).await,
        Commands::Currency(args) => commands::currency::execute(args, &config).await,
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<PricingError>() {
        return match err {
            PricingError::UnknownField(_) => ExitCodes::INVALID_ARGS,
            PricingError::InvalidDenominator { .. }
            | PricingError::InvalidValue { .. }
            | PricingError::InvalidPayeeHandle(_)
            | PricingError::InvalidNote(_) => ExitCodes::VALIDATION_FAILURE,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }
    if e.downcast_ref::<StoreError>().is_some() {
        return ExitCodes::STORE_ERROR;
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("validation") || msg.contains("invalid") {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.contains("store") {
        ExitCodes::STORE_ERROR
    } else if msg.contains("argument") || msg.contains("not configured") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
