//! CLI configuration.
//!
//! Values come from an optional `printrate.toml`, then from `PRINTRATE_*`
//! environment variables, then from command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use printrate_core::ReverseGeocodeLookup;
use printrate_store::SETTINGS_KEY;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "printrate.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// JSON file backing the key-value store.
    pub store_path: PathBuf,
    /// Key the rate settings blob lives under.
    pub settings_key: String,
    /// Upper bound on currency detection.
    pub detect_timeout_ms: u64,
    pub geocode_url: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("printrate.json"),
            settings_key: SETTINGS_KEY.to_string(),
            detect_timeout_ms: 5000,
            geocode_url: ReverseGeocodeLookup::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Config file not found: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PRINTRATE_*` overrides. Unparseable numbers are ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("PRINTRATE_STORE") {
            self.store_path = PathBuf::from(path);
        }

        if let Some(key) = var("PRINTRATE_SETTINGS_KEY") {
            if !key.is_empty() {
                self.settings_key = key;
            }
        }

        if let Some(timeout) = var("PRINTRATE_DETECT_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.detect_timeout_ms = value;
            }
        }

        if let Some(url) = var("PRINTRATE_GEOCODE_URL") {
            self.geocode_url = url;
        }
    }

    pub fn detect_timeout(&self) -> Duration {
        Duration::from_millis(self.detect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.settings_key, "printRateSettings");
        assert_eq!(config.detect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CliConfig::from_toml_str("store_path = \"/var/lib/printrate/store.json\"\n").unwrap();
        assert_eq!(config.store_path, PathBuf::from("/var/lib/printrate/store.json"));
        assert_eq!(config.settings_key, SETTINGS_KEY);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PRINTRATE_STORE", "shop.json"),
            ("PRINTRATE_DETECT_TIMEOUT_MS", "250"),
            ("PRINTRATE_SETTINGS_KEY", ""),
        ]
        .into_iter()
        .collect();

        let mut config = CliConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.store_path, PathBuf::from("shop.json"));
        assert_eq!(config.detect_timeout_ms, 250);
        assert_eq!(config.settings_key, SETTINGS_KEY);
    }

    #[test]
    fn test_bad_timeout_ignored() {
        let mut config = CliConfig::default();
        config.apply_overrides(|name| (name == "PRINTRATE_DETECT_TIMEOUT_MS").then(|| "soon".to_string()));
        assert_eq!(config.detect_timeout_ms, 5000);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = tempdir().unwrap();
        let err = CliConfig::from_file(&temp.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("printrate.toml");
        std::fs::write(&path, "detect_timeout_ms = 100\ngeocode_url = \"http://localhost:9000\"\n").unwrap();

        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.detect_timeout_ms, 100);
        assert_eq!(config.geocode_url, "http://localhost:9000");
    }
}
