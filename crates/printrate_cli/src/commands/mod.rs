//! CLI command definitions.
//!
//! This module defines the command structure for the printrate CLI.
//! Each subcommand maps to one screen of the print shop workflow.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use printrate_store::{FileStore, SettingsStore};

use crate::config::CliConfig;

pub mod currency;
pub mod pay_link;
pub mod payee;
pub mod quote;
pub mod settings;

/// printrate - print shop cost calculator
#[derive(Parser)]
#[command(name = "printrate")]
#[command(version, about = "printrate - print shop cost calculator")]
#[command(long_about = r#"
printrate prices print jobs from configurable paper, ink, electricity and
margin rates, and produces UPI payment links for the customer total.

COMMANDS:
  quote     → Price a job and show the cost breakdown
  settings  → Show, edit or reset the rate settings
  payee     → Configure who receives payments
  pay-link  → Build a UPI payment link for a job
  currency  → List currencies or detect one from a location

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Store error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./printrate.toml when present)
    #[arg(short, long, global = true, env = "PRINTRATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store file, overriding the config
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Price a print job
    Quote(quote::QuoteArgs),

    /// Manage rate settings
    Settings(settings::SettingsArgs),

    /// Manage the payment recipient
    Payee(payee::PayeeArgs),

    /// Build a payment link for a print job
    #[command(name = "pay-link")]
    PayLink(pay_link::PayLinkArgs),

    /// Currency tables and detection
    Currency(currency::CurrencyArgs),
}

/// Settings persistence rooted at the configured store file.
pub fn open_settings(config: &CliConfig) -> SettingsStore<FileStore> {
    SettingsStore::new(FileStore::new(&config.store_path))
}
