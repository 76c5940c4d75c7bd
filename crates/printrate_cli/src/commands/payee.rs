//! Payee command - Configure who receives payments.

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use printrate_core::validate_payee_handle;
use printrate_store::Payee;

use crate::commands::open_settings;
use crate::config::CliConfig;

#[derive(Args)]
pub struct PayeeArgs {
    #[command(subcommand)]
    action: PayeeAction,
}

#[derive(Subcommand)]
enum PayeeAction {
    /// Print the configured payee
    Show,

    /// Save a payee handle and display name
    Set {
        /// UPI handle: a mobile number or user@bank
        #[arg(long)]
        handle: String,

        /// Name shown to the payer
        #[arg(long, default_value = "")]
        name: String,
    },
}

pub async fn execute(args: PayeeArgs, config: &CliConfig) -> Result<()> {
    let store = open_settings(config);

    match args.action {
        PayeeAction::Show => {
            let payee = store.load_payee();
            if payee.is_configured() {
                println!("Handle: {}", payee.handle);
                println!("Name:   {}", payee.name);
            } else {
                println!("⚠️  No payee configured. Run `printrate payee set --handle <upi-id>`");
            }
        }
        PayeeAction::Set { handle, name } => {
            let handle = handle.trim().to_string();
            validate_payee_handle(&handle)?;
            store.save_payee(&Payee::new(handle.clone(), name.trim()))?;
            info!("Saved payee {}", handle);
            println!("✅ Payee set to {}", handle);
        }
    }

    Ok(())
}
