//! Rate settings persistence.
//!
//! Settings are stored as one JSON blob per key and merged onto defaults on
//! load. Reading never fails: an absent blob, a blob that does not decode,
//! a merged result that fails [`RateSettings::validate`], or a store that
//! cannot be read all produce the defaults, so a quote can always be
//! computed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use printrate_core::{merge_settings, RateSettings, RateSettingsPatch};

use crate::error::StoreResult;
use crate::store::KeyValueStore;

/// Key of the rate settings blob.
pub const SETTINGS_KEY: &str = "printRateSettings";
/// Key of the payee handle.
pub const PAYEE_HANDLE_KEY: &str = "upiAddress";
/// Key of the payee display name.
pub const PAYEE_NAME_KEY: &str = "upiName";

/// Identity that receives payment links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
    pub handle: String,
    pub name: String,
}

impl Payee {
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.handle.is_empty()
    }
}

/// Loads and saves [`RateSettings`] through an injected store.
pub struct SettingsStore<S: KeyValueStore> {
    store: S,
    defaults: RateSettings,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Use [`RateSettings::default`] as the merge base.
    pub fn new(store: S) -> Self {
        Self::with_defaults(store, RateSettings::default())
    }

    pub fn with_defaults(store: S, defaults: RateSettings) -> Self {
        Self { store, defaults }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn defaults(&self) -> &RateSettings {
        &self.defaults
    }

    /// Load settings, falling back to defaults on any problem.
    pub fn load(&self, key: &str) -> RateSettings {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted settings under {}, using defaults", key);
                return self.defaults.clone();
            }
            Err(e) => {
                warn!("Could not read settings {}: {}; using defaults", key, e);
                return self.defaults.clone();
            }
        };

        let patch = match RateSettingsPatch::from_json(&raw) {
            Ok(patch) => patch,
            Err(e) => {
                warn!("Persisted settings {} did not decode: {}; using defaults", key, e);
                return self.defaults.clone();
            }
        };

        debug!("Merging persisted settings from {}", key);
        let merged = merge_settings(&self.defaults, &patch);
        match merged.validate() {
            Ok(()) => merged,
            Err(e) => {
                warn!("Persisted settings {} are invalid: {}; using defaults", key, e);
                self.defaults.clone()
            }
        }
    }

    /// Write settings wholesale.
    pub fn save(&self, key: &str, settings: &RateSettings) -> StoreResult<()> {
        let json = serde_json::to_string(settings)?;
        self.store.set(key, &json)?;
        info!("Saved rate settings under {}", key);
        Ok(())
    }

    /// Forget persisted settings so the next load returns defaults.
    pub fn reset(&self, key: &str) -> StoreResult<()> {
        self.store.remove(key)?;
        info!("Reset rate settings under {}", key);
        Ok(())
    }

    /// Read the payee; missing or unreadable fields are empty.
    pub fn load_payee(&self) -> Payee {
        Payee {
            handle: self.read_text(PAYEE_HANDLE_KEY),
            name: self.read_text(PAYEE_NAME_KEY),
        }
    }

    /// Values are written as JSON string literals so any text reads back
    /// unchanged.
    pub fn save_payee(&self, payee: &Payee) -> StoreResult<()> {
        self.store.set(PAYEE_HANDLE_KEY, &serde_json::to_string(&payee.handle)?)?;
        self.store.set(PAYEE_NAME_KEY, &serde_json::to_string(&payee.name)?)?;
        Ok(())
    }

    /// JSON string literals are decoded; anything else is taken raw.
    fn read_text(&self, key: &str) -> String {
        match self.store.get(key) {
            Ok(Some(raw)) => serde_json::from_str::<String>(&raw).unwrap_or(raw),
            Ok(None) => String::new(),
            Err(e) => {
                warn!("Could not read {}: {}", key, e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryStore;
    use mockall::mock;

    mock! {
        pub Kv {}

        impl KeyValueStore for Kv {
            fn get(&self, key: &str) -> StoreResult<Option<String>>;
            fn set(&self, key: &str, value: &str) -> StoreResult<()>;
            fn remove(&self, key: &str) -> StoreResult<()>;
        }
    }

    #[test]
    fn test_load_absent_returns_defaults() {
        let settings = SettingsStore::new(MemoryStore::new());
        assert_eq!(settings.load(SETTINGS_KEY), RateSettings::default());
    }

    #[test]
    fn test_load_undecodable_returns_defaults() {
        let store = MemoryStore::new().with_entry(SETTINGS_KEY, "{not json");
        let settings = SettingsStore::new(store);
        assert_eq!(settings.load(SETTINGS_KEY), RateSettings::default());
    }

    #[test]
    fn test_load_zero_denominator_returns_defaults() {
        let store = MemoryStore::new().with_entry(SETTINGS_KEY, r#"{"pageCost": {"pages": 0}}"#);
        let loaded = SettingsStore::new(store).load(SETTINGS_KEY);
        assert_eq!(loaded, RateSettings::default());
    }

    #[test]
    fn test_load_invalid_blob_keeps_quote_finite() {
        let store = MemoryStore::new().with_entry(
            SETTINGS_KEY,
            r#"{"pageCost": {"pages": "0"}, "colorInk": {"yield": 0}, "electricity": 0.1}"#,
        );
        let loaded = SettingsStore::new(store).load(SETTINGS_KEY);
        assert!(loaded.validate().is_ok());
        assert_eq!(loaded.electricity, RateSettings::default().electricity);

        let quote = printrate_core::compute_rates(
            10,
            printrate_core::DuplexMode::OneSided,
            printrate_core::ColorMode::Color,
            &loaded,
        );
        assert!(quote.cost_per_page.is_finite());
        assert!(quote.ink_cost_per_page.is_finite());
        assert!(quote.customer_total.is_finite());
    }

    #[test]
    fn test_load_rejects_out_of_range_discount() {
        let store = MemoryStore::new().with_entry(SETTINGS_KEY, r#"{"discount": {"percentage": 150}}"#);
        assert_eq!(SettingsStore::new(store).load(SETTINGS_KEY), RateSettings::default());
    }

    #[test]
    fn test_load_read_failure_returns_defaults() {
        let mut kv = MockKv::new();
        kv.expect_get()
            .withf(|key: &str| key == SETTINGS_KEY)
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("disk offline".to_string())));

        let settings = SettingsStore::new(kv);
        assert_eq!(settings.load(SETTINGS_KEY), RateSettings::default());
    }

    #[test]
    fn test_save_writes_full_blob_once() {
        let mut kv = MockKv::new();
        kv.expect_set()
            .withf(|key: &str, value: &str| {
                key == SETTINGS_KEY
                    && value.contains("\"pageCost\"")
                    && value.contains("\"discount\"")
                    && value.contains("\"currencyUnit\"")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let settings = SettingsStore::new(kv);
        settings.save(SETTINGS_KEY, &RateSettings::default()).unwrap();
    }

    #[test]
    fn test_save_propagates_write_failure() {
        let store = MemoryStore::new().simulate_failure("quota exceeded");
        let settings = SettingsStore::new(store);
        assert!(settings.save(SETTINGS_KEY, &RateSettings::default()).is_err());
    }

    #[test]
    fn test_custom_defaults_are_merge_base() {
        let mut defaults = RateSettings::default();
        defaults.currency_unit = "$".to_string();
        let store = MemoryStore::new().with_entry(SETTINGS_KEY, r#"{"electricity": 0.1}"#);

        let loaded = SettingsStore::with_defaults(store, defaults).load(SETTINGS_KEY);
        assert_eq!(loaded.currency_unit, "$");
        assert_eq!(loaded.electricity, 0.1);
    }

    #[test]
    fn test_payee_round_trip_and_raw_values() {
        let store = MemoryStore::new();
        let settings = SettingsStore::new(store.clone());
        assert!(!settings.load_payee().is_configured());

        settings.save_payee(&Payee::new("desk@okaxis", "Print Desk")).unwrap();
        assert_eq!(store.get(PAYEE_NAME_KEY).unwrap(), Some("\"Print Desk\"".to_string()));
        assert_eq!(settings.load_payee(), Payee::new("desk@okaxis", "Print Desk"));
    }

    #[test]
    fn test_payee_text_survives_round_trip() {
        let settings = SettingsStore::new(MemoryStore::new());
        let payee = Payee::new("9876543210", "\"Desk\"");

        settings.save_payee(&payee).unwrap();
        assert_eq!(settings.load_payee(), payee);
    }

    #[test]
    fn test_payee_raw_legacy_value_read() {
        let store = MemoryStore::new().with_entry(PAYEE_NAME_KEY, "Corner Prints");
        assert_eq!(SettingsStore::new(store).load_payee().name, "Corner Prints");
    }

    #[test]
    fn test_payee_json_string_literal_unwrapped() {
        let store = MemoryStore::new().with_entry(PAYEE_HANDLE_KEY, "\"9876543210\"");
        let payee = SettingsStore::new(store).load_payee();
        assert_eq!(payee.handle, "9876543210");
        assert_eq!(payee.name, "");
    }
}
