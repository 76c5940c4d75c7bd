//! Currency tables and background currency detection.
//!
//! Detection resolves device coordinates to a country, the country to an
//! ISO 4217 code and the code to a display symbol. It runs as a tokio task
//! that publishes exactly one symbol, falling back to
//! [`FALLBACK_CURRENCY_SYMBOL`] on any failure, so it never holds up a quote.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{PricingError, PricingResult};
use crate::settings::{RateSettings, FALLBACK_CURRENCY_SYMBOL};

/// A selectable currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    pub symbol: &'static str,
    pub name: &'static str,
}

const fn currency(symbol: &'static str, name: &'static str) -> CurrencyInfo {
    CurrencyInfo { symbol, name }
}

/// Currencies offered by the settings surface.
pub const CURRENCIES: &[CurrencyInfo] = &[
    currency("₹", "Indian Rupee (₹)"),
    currency("$", "US Dollar ($)"),
    currency("€", "Euro (€)"),
    currency("£", "British Pound (£)"),
    currency("¥", "Japanese Yen (¥)"),
    currency("₩", "South Korean Won (₩)"),
    currency("₱", "Philippine Peso (₱)"),
    currency("A$", "Australian Dollar (A$)"),
    currency("C$", "Canadian Dollar (C$)"),
    currency("CHF", "Swiss Franc (CHF)"),
    currency("NZ$", "New Zealand Dollar (NZ$)"),
    currency("R$", "Brazilian Real (R$)"),
    currency("₺", "Turkish Lira (₺)"),
    currency("₽", "Russian Ruble (₽)"),
    currency("HK$", "Hong Kong Dollar (HK$)"),
    currency("SGD", "Singapore Dollar (SGD)"),
    currency("ZAR", "South African Rand (ZAR)"),
    currency("฿", "Thai Baht (฿)"),
    currency("₦", "Nigerian Naira (₦)"),
    currency("MX$", "Mexican Peso (MX$)"),
    currency("SEK", "Swedish Krona (SEK)"),
    currency("NOK", "Norwegian Krone (NOK)"),
    currency("DKK", "Danish Krone (DKK)"),
    currency("MYR", "Malaysian Ringgit (MYR)"),
    currency("BHD", "Bahraini Dinar (BHD)"),
    currency("KWD", "Kuwaiti Dinar (KWD)"),
    currency("OMR", "Omani Rial (OMR)"),
    currency("QAR", "Qatari Rial (QAR)"),
    currency("AED", "United Arab Emirates Dirham (AED)"),
    currency("BND", "Brunei Dollar (BND)"),
    currency("JOD", "Jordanian Dinar (JOD)"),
    currency("CNY", "Chinese Yuan (CNY)"),
    currency("TWD", "New Taiwan Dollar (TWD)"),
    currency("ISK", "Icelandic Króna (ISK)"),
    currency("PEN", "Peruvian Nuevo Sol (PEN)"),
    currency("COP", "Colombian Peso (COP)"),
    currency("CLP", "Chilean Peso (CLP)"),
    currency("VEF", "Venezuelan Bolívar (VEF)"),
    currency("MUR", "Mauritian Rupee (MUR)"),
    currency("SCR", "Seychellois Rupee (SCR)"),
    currency("TND", "Tunisian Dinar (TND)"),
    currency("KZT", "Kazakhstani Tenge (KZT)"),
    currency("RUB", "Russian Ruble (RUB)"),
];

/// [`CURRENCIES`] ordered by display name.
pub fn sorted_currencies() -> Vec<CurrencyInfo> {
    let mut list = CURRENCIES.to_vec();
    list.sort_by(|a, b| a.name.cmp(b.name));
    list
}

/// ISO 3166 alpha-2 country code to ISO 4217 currency code.
pub fn currency_for_country(country: &str) -> Option<&'static str> {
    let code = match country.trim().to_uppercase().as_str() {
        "IN" => "INR",
        "US" | "EC" | "SV" | "PR" => "USD",
        "AT" | "BE" | "CY" | "DE" | "EE" | "ES" | "FI" | "FR" | "GR" | "HR" | "IE" | "IT" | "LT"
        | "LU" | "LV" | "MT" | "NL" | "PT" | "SI" | "SK" => "EUR",
        "GB" => "GBP",
        "JP" => "JPY",
        "KR" => "KRW",
        "PH" => "PHP",
        "AU" => "AUD",
        "CA" => "CAD",
        "CH" | "LI" => "CHF",
        "NZ" => "NZD",
        "BR" => "BRL",
        "TR" => "TRY",
        "RU" => "RUB",
        "HK" => "HKD",
        "SG" => "SGD",
        "ZA" => "ZAR",
        "TH" => "THB",
        "NG" => "NGN",
        "MX" => "MXN",
        "SE" => "SEK",
        "NO" => "NOK",
        "DK" => "DKK",
        "MY" => "MYR",
        "BH" => "BHD",
        "KW" => "KWD",
        "OM" => "OMR",
        "QA" => "QAR",
        "AE" => "AED",
        "BN" => "BND",
        "JO" => "JOD",
        "CN" => "CNY",
        "TW" => "TWD",
        "IS" => "ISK",
        "PE" => "PEN",
        "CO" => "COP",
        "CL" => "CLP",
        "VE" => "VEF",
        "MU" => "MUR",
        "SC" => "SCR",
        "TN" => "TND",
        "KZ" => "KZT",
        _ => return None,
    };
    Some(code)
}

/// ISO 4217 code to the symbol used in [`CURRENCIES`].
pub fn symbol_for_currency(code: &str) -> Option<&'static str> {
    let symbol = match code.trim().to_uppercase().as_str() {
        "INR" => "₹",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "KRW" => "₩",
        "PHP" => "₱",
        "AUD" => "A$",
        "CAD" => "C$",
        "NZD" => "NZ$",
        "BRL" => "R$",
        "TRY" => "₺",
        "RUB" => "₽",
        "HKD" => "HK$",
        "THB" => "฿",
        "NGN" => "₦",
        "MXN" => "MX$",
        other => return CURRENCIES.iter().find(|c| c.symbol == other).map(|c| c.symbol),
    };
    Some(symbol)
}

/// Device position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Resolves coordinates to a country code.
#[async_trait]
pub trait CountryLookup: Send + Sync {
    /// ISO 3166 alpha-2 code of the country containing `coords`.
    async fn country_code(&self, coords: Coordinates) -> PricingResult<String>;
}

/// Reverse geocoding over HTTP.
///
/// Expects a JSON response carrying a `countryCode` field, as returned by
/// client-side reverse geocode services.
pub struct ReverseGeocodeLookup {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseGeocodeResponse {
    #[serde(default)]
    country_code: String,
}

impl ReverseGeocodeLookup {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for ReverseGeocodeLookup {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl CountryLookup for ReverseGeocodeLookup {
    async fn country_code(&self, coords: Coordinates) -> PricingResult<String> {
        debug!("Reverse geocoding {:?} via {}", coords, self.endpoint);

        let response: ReverseGeocodeResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.country_code.is_empty() {
            return Err(PricingError::Lookup(format!(
                "no country for {}, {}",
                coords.latitude, coords.longitude
            )));
        }
        Ok(response.country_code)
    }
}

/// Resolve the display symbol for a position.
pub async fn detect_currency_symbol(
    lookup: &dyn CountryLookup,
    coords: Coordinates,
) -> PricingResult<&'static str> {
    let country = lookup.country_code(coords).await?;
    let code = currency_for_country(&country).ok_or_else(|| PricingError::UnknownCountry(country.clone()))?;
    symbol_for_currency(code).ok_or_else(|| PricingError::UnsupportedCurrency(code.to_string()))
}

/// Spawns currency detection tasks.
pub struct CurrencyDetector;

impl CurrencyDetector {
    /// Start detection in the background.
    ///
    /// Must be called from within a tokio runtime. With no coordinates (no
    /// location permission) the fallback is published straight away.
    pub fn spawn(
        lookup: Arc<dyn CountryLookup>,
        coords: Option<Coordinates>,
        timeout: Duration,
    ) -> DetectionHandle {
        let (tx, rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let symbol = match coords {
                None => {
                    debug!("No coordinates available, using fallback currency");
                    FALLBACK_CURRENCY_SYMBOL
                }
                Some(coords) => {
                    match tokio::time::timeout(timeout, detect_currency_symbol(lookup.as_ref(), coords)).await {
                        Ok(Ok(symbol)) => {
                            info!("Detected currency symbol {}", symbol);
                            symbol
                        }
                        Ok(Err(e)) => {
                            warn!("Currency detection failed, using fallback: {}", e);
                            FALLBACK_CURRENCY_SYMBOL
                        }
                        Err(_) => {
                            warn!("Currency detection timed out after {:?}, using fallback", timeout);
                            FALLBACK_CURRENCY_SYMBOL
                        }
                    }
                }
            };
            tx.send(Some(symbol.to_string())).ok();
        });

        DetectionHandle { rx, task }
    }
}

/// Handle to a running detection task.
pub struct DetectionHandle {
    rx: watch::Receiver<Option<String>>,
    task: JoinHandle<()>,
}

impl DetectionHandle {
    /// The published symbol, if detection has finished.
    pub fn current(&self) -> Option<String> {
        self.rx.borrow().clone()
    }

    /// Stop detection. Nothing is published afterwards.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Copy a published symbol into `settings`. Returns whether it did.
    pub fn apply_to(&self, settings: &mut RateSettings) -> bool {
        match self.current() {
            Some(symbol) => {
                settings.currency_unit = symbol;
                true
            }
            None => false,
        }
    }

    /// Wait for the result; a cancelled task resolves to the fallback.
    pub async fn wait(mut self) -> String {
        loop {
            if let Some(symbol) = self.rx.borrow_and_update().clone() {
                return symbol;
            }
            if self.rx.changed().await.is_err() {
                return self
                    .rx
                    .borrow()
                    .clone()
                    .unwrap_or_else(|| FALLBACK_CURRENCY_SYMBOL.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCountry(&'static str);

    #[async_trait]
    impl CountryLookup for FixedCountry {
        async fn country_code(&self, _coords: Coordinates) -> PricingResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl CountryLookup for FailingLookup {
        async fn country_code(&self, _coords: Coordinates) -> PricingResult<String> {
            Err(PricingError::Lookup("permission denied".to_string()))
        }
    }

    struct SlowLookup;

    #[async_trait]
    impl CountryLookup for SlowLookup {
        async fn country_code(&self, _coords: Coordinates) -> PricingResult<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("US".to_string())
        }
    }

    fn somewhere() -> Option<Coordinates> {
        Some(Coordinates::new(40.7, -74.0))
    }

    #[test]
    fn test_currency_table_lookups() {
        assert_eq!(currency_for_country("in"), Some("INR"));
        assert_eq!(currency_for_country("DE"), Some("EUR"));
        assert_eq!(currency_for_country("AQ"), None);
        assert_eq!(symbol_for_currency("GBP"), Some("£"));
        assert_eq!(symbol_for_currency("SGD"), Some("SGD"));
        assert_eq!(symbol_for_currency("XXX"), None);
    }

    #[test]
    fn test_every_country_currency_has_a_symbol() {
        for country in ["IN", "US", "FR", "JP", "BR", "AE", "KZ", "VE", "CH", "RU"] {
            let code = currency_for_country(country).unwrap();
            assert!(symbol_for_currency(code).is_some(), "no symbol for {}", code);
        }
    }

    #[test]
    fn test_sorted_currencies_by_name() {
        let sorted = sorted_currencies();
        assert_eq!(sorted.len(), CURRENCIES.len());
        assert_eq!(sorted[0].name, "Australian Dollar (A$)");
        assert!(sorted.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[tokio::test]
    async fn test_detection_publishes_country_symbol() {
        let handle = CurrencyDetector::spawn(Arc::new(FixedCountry("GB")), somewhere(), Duration::from_secs(5));
        assert_eq!(handle.wait().await, "£");
    }

    #[tokio::test]
    async fn test_detection_falls_back_on_error() {
        let handle = CurrencyDetector::spawn(Arc::new(FailingLookup), somewhere(), Duration::from_secs(5));
        assert_eq!(handle.wait().await, FALLBACK_CURRENCY_SYMBOL);
    }

    #[tokio::test]
    async fn test_detection_falls_back_on_unknown_country() {
        let handle = CurrencyDetector::spawn(Arc::new(FixedCountry("AQ")), somewhere(), Duration::from_secs(5));
        assert_eq!(handle.wait().await, FALLBACK_CURRENCY_SYMBOL);
    }

    #[tokio::test]
    async fn test_detection_falls_back_on_timeout() {
        let handle = CurrencyDetector::spawn(Arc::new(SlowLookup), somewhere(), Duration::from_millis(20));
        assert_eq!(handle.wait().await, FALLBACK_CURRENCY_SYMBOL);
    }

    #[tokio::test]
    async fn test_detection_without_coordinates() {
        let handle = CurrencyDetector::spawn(Arc::new(FixedCountry("US")), None, Duration::from_secs(5));
        assert_eq!(handle.wait().await, FALLBACK_CURRENCY_SYMBOL);
    }

    #[tokio::test]
    async fn test_cancelled_detection_publishes_nothing() {
        let handle = CurrencyDetector::spawn(Arc::new(SlowLookup), somewhere(), Duration::from_secs(60));
        handle.cancel();

        let mut settings = RateSettings::default();
        settings.currency_unit = "$".to_string();
        assert!(!handle.apply_to(&mut settings));
        assert_eq!(settings.currency_unit, "$");
        assert_eq!(handle.wait().await, FALLBACK_CURRENCY_SYMBOL);
    }

    #[tokio::test]
    async fn test_apply_to_copies_published_symbol() {
        let handle = CurrencyDetector::spawn(Arc::new(FixedCountry("JP")), somewhere(), Duration::from_secs(5));
        while handle.current().is_none() {
            tokio::task::yield_now().await;
        }
        let mut settings = RateSettings::default();
        assert!(handle.apply_to(&mut settings));
        assert_eq!(settings.currency_unit, "¥");
    }
}
