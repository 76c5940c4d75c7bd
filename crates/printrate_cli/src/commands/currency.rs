//! Currency command - List currencies or detect one from a location.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use printrate_core::{sorted_currencies, Coordinates, CurrencyDetector, ReverseGeocodeLookup};

use crate::commands::open_settings;
use crate::config::CliConfig;

#[derive(Args)]
pub struct CurrencyArgs {
    #[command(subcommand)]
    action: CurrencyAction,
}

#[derive(Subcommand)]
enum CurrencyAction {
    /// List selectable currencies by name
    List,

    /// Detect the local currency symbol
    Detect {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Store the result as the settings currency unit
        #[arg(long)]
        save: bool,
    },
}

pub async fn execute(args: CurrencyArgs, config: &CliConfig) -> Result<()> {
    match args.action {
        CurrencyAction::List => {
            for currency in sorted_currencies() {
                println!("{:<4} {}", currency.symbol, currency.name);
            }
        }
        CurrencyAction::Detect { lat, lon, save } => {
            let coords = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
            let lookup = Arc::new(ReverseGeocodeLookup::new(config.geocode_url.clone()));
            let symbol = CurrencyDetector::spawn(lookup, coords, config.detect_timeout())
                .wait()
                .await;
            println!("{}", symbol);

            if save {
                let store = open_settings(config);
                let mut settings = store.load(&config.settings_key);
                settings.currency_unit = symbol;
                store.save(&config.settings_key, &settings)?;
                info!("Saved currency unit {}", settings.currency_unit);
            }
        }
    }

    Ok(())
}
