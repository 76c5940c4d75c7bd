//! Quote command - Price a print job.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use printrate_core::{
    parse_page_count, ColorMode, Coordinates, CostBreakdown, CurrencyDetector, DuplexMode,
    FormattedBreakdown, PrintJob, RateSettings, ReverseGeocodeLookup,
};

use crate::commands::open_settings;
use crate::config::CliConfig;

/// The job being priced, shared with `pay-link`.
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Number of pages (non-numeric input counts as 0)
    #[arg(short, long, allow_hyphen_values = true)]
    pub pages: String,

    /// 1-Sided or 2-Sided
    #[arg(short, long, default_value = "1-Sided")]
    pub duplex: DuplexMode,

    /// bw or color
    #[arg(short, long, default_value = "bw")]
    pub mode: ColorMode,
}

impl JobArgs {
    pub fn job(&self) -> PrintJob {
        PrintJob::new(parse_page_count(&self.pages), self.duplex, self.mode)
    }
}

#[derive(Args)]
pub struct QuoteArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Show the internal cost lines regardless of settings
    #[arg(long)]
    internal: bool,

    /// Latitude for currency detection
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude for currency detection
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteOutput<'a> {
    job: PrintJob,
    currency_unit: &'a str,
    breakdown: CostBreakdown,
    formatted: FormattedBreakdown,
}

pub async fn execute(args: QuoteArgs, config: &CliConfig) -> Result<()> {
    let mut settings = open_settings(config).load(&config.settings_key);
    let job = args.job.job();

    // Detection runs alongside the calculation and only affects the symbol.
    let detection = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            let lookup = Arc::new(ReverseGeocodeLookup::new(config.geocode_url.clone()));
            Some(CurrencyDetector::spawn(
                lookup,
                Some(Coordinates::new(lat, lon)),
                config.detect_timeout(),
            ))
        }
        _ => None,
    };

    let breakdown = job.quote(&settings);
    info!(
        "Quoted {} pages ({}, {}): {}",
        job.page_count,
        job.duplex,
        job.color,
        breakdown.formatted().customer_total
    );

    if let Some(handle) = detection {
        settings.currency_unit = handle.wait().await;
        debug!("Using detected currency {}", settings.currency_unit);
    }

    if args.json {
        let output = QuoteOutput {
            job,
            currency_unit: &settings.currency_unit,
            breakdown,
            formatted: breakdown.formatted(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let show_internal = args.internal || settings.show_internal_cost;
        print!("{}", render_quote(&job, &breakdown, &settings, show_internal));
    }

    Ok(())
}

/// Human-readable breakdown.
pub fn render_quote(
    job: &PrintJob,
    breakdown: &CostBreakdown,
    settings: &RateSettings,
    show_internal: bool,
) -> String {
    let f = breakdown.formatted();
    let cur = settings.currency_unit.as_str();
    let mut out = format!("🖨️  {} pages, {}, {}\n", job.page_count, job.duplex, job.color);
    out.push_str(&format!("   Sheets used:          {}\n", f.sheets_used));

    if show_internal {
        let lines = [
            ("Cost per sheet:", &f.cost_per_page),
            ("Ink per page:", &f.ink_cost_per_page),
            ("Paper:", &f.total_page_cost),
            ("Ink:", &f.total_ink_cost),
            ("Electricity:", &f.total_electricity_cost),
            ("Internal cost:", &f.internal_cost),
            ("Profit per print:", &f.profit_per_print),
            ("Total profit:", &f.total_profit),
        ];
        out.push('\n');
        for (label, value) in lines {
            out.push_str(&format!("   {:<21} {}{}\n", label, cur, value));
        }
        out.push('\n');
    }

    if breakdown.discount_applied > 0.0 {
        out.push_str(&format!("   Before discount:      {}{}\n", cur, f.customer_total_before_discount));
        out.push_str(&format!(
            "   Bulk discount ({}%):  -{}{}\n",
            settings.discount.percentage, cur, f.discount_applied
        ));
    }
    out.push_str(&format!("   Customer total:       {}{}\n", cur, f.customer_total));
    out.push_str(&format!("   Per page:             {}{}\n", cur, f.customer_cost_per_page));
    out
}
