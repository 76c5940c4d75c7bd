//! Pay-link command - Build a UPI payment link for a job.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use printrate_core::PaymentRequest;

use crate::commands::open_settings;
use crate::commands::quote::JobArgs;
use crate::config::CliConfig;

#[derive(Args)]
pub struct PayLinkArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output the request and link as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PayLinkOutput<'a> {
    request: &'a PaymentRequest,
    uri: String,
}

pub async fn execute(args: PayLinkArgs, config: &CliConfig) -> Result<()> {
    let store = open_settings(config);
    let payee = store.load_payee();
    if !payee.is_configured() {
        anyhow::bail!("Payee handle not configured; run `printrate payee set --handle <upi-id>`");
    }

    let settings = store.load(&config.settings_key);
    let job = args.job.job();
    let breakdown = job.quote(&settings);
    if breakdown.is_zero() {
        warn!("Job has no billable pages; the link carries no amount");
    }

    let request = PaymentRequest::for_quote(payee.handle, payee.name, &job, &breakdown);
    let uri = request.to_uri();
    info!("Payment link for {}: {:.2}", request.note, request.amount);

    if args.json {
        let output = PayLinkOutput { request: &request, uri };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", uri);
    }

    Ok(())
}
