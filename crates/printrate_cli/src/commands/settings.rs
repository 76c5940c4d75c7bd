//! Settings command - Show, edit or reset the rate settings.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::Value;
use tracing::info;

use printrate_core::{RateSettings, SETTINGS_FIELDS};

use crate::commands::open_settings;
use crate::config::CliConfig;

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    action: SettingsAction,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change one field, e.g. `set pageCost.cost 350`
    Set {
        /// Dotted field path
        field: String,

        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Discard saved settings and return to defaults
    Reset,
}

pub async fn execute(args: SettingsArgs, config: &CliConfig) -> Result<()> {
    let store = open_settings(config);

    match args.action {
        SettingsAction::Show { json } => {
            let settings = store.load(&config.settings_key);
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print!("{}", render_settings(&settings)?);
            }
        }
        SettingsAction::Set { field, value } => {
            let mut settings = store.load(&config.settings_key);
            settings.set_field(&field, &value)?;
            settings.validate()?;
            store.save(&config.settings_key, &settings)?;
            info!("Set {} = {}", field, value);
            println!("✅ {} = {}", field, value);
        }
        SettingsAction::Reset => {
            store.reset(&config.settings_key)?;
            println!("✅ Settings reset to defaults");
        }
    }

    Ok(())
}

/// One `field = value` line per editable field.
pub fn render_settings(settings: &RateSettings) -> Result<String> {
    let tree = serde_json::to_value(settings)?;
    let mut out = String::new();
    for field in SETTINGS_FIELDS {
        out.push_str(&format!("{:<34} {}\n", field, field_value(&tree, field)));
    }
    Ok(out)
}

fn field_value(tree: &Value, path: &str) -> String {
    let node = path.split('.').try_fold(tree, |node, segment| node.get(segment));
    match node {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
