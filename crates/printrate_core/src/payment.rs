//! Payment-request links for a computed quote.
//!
//! Produces a UPI deep link (`upi://pay?...`) that an external QR renderer
//! turns into a scannable code. The builder does not validate the payee;
//! [`validate_payee_handle`] is for the settings edit surface.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::calculator::{ColorMode, CostBreakdown, DuplexMode, PrintJob};
use crate::error::{PricingError, PricingResult};

/// Currencies a payment link can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentCurrency {
    #[default]
    INR,
}

impl fmt::Display for PaymentCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentCurrency::INR => write!(f, "INR"),
        }
    }
}

/// Deterministic transaction note describing a print job.
///
/// Rendered as `PRINT-<1S|2S>-<BW|CL>-<pages>P`, e.g. `PRINT-1S-BW-10P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintNote {
    pub duplex: DuplexMode,
    pub color: ColorMode,
    pub page_count: u64,
}

impl PrintNote {
    pub fn for_job(job: &PrintJob) -> Self {
        Self {
            duplex: job.duplex,
            color: job.color,
            page_count: job.page_count.max(0) as u64,
        }
    }
}

impl fmt::Display for PrintNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duplex = match self.duplex {
            DuplexMode::OneSided => "1S",
            DuplexMode::TwoSided => "2S",
        };
        let color = match self.color {
            ColorMode::BlackAndWhite => "BW",
            ColorMode::Color => "CL",
        };
        write!(f, "PRINT-{}-{}-{}P", duplex, color, self.page_count)
    }
}

impl FromStr for PrintNote {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PricingError::InvalidNote(s.to_string());
        let parts: Vec<&str> = s.split('-').collect();
        let [prefix, duplex, color, pages] = parts.as_slice() else {
            return Err(invalid());
        };
        if *prefix != "PRINT" {
            return Err(invalid());
        }
        let duplex = match *duplex {
            "1S" => DuplexMode::OneSided,
            "2S" => DuplexMode::TwoSided,
            _ => return Err(invalid()),
        };
        let color = match *color {
            "BW" => ColorMode::BlackAndWhite,
            "CL" => ColorMode::Color,
            _ => return Err(invalid()),
        };
        let page_count = pages
            .strip_suffix('P')
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or_else(invalid)?;
        Ok(Self {
            duplex,
            color,
            page_count,
        })
    }
}

/// Everything needed to render one payment link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub payee_handle: String,
    pub payee_name: String,
    pub amount: f64,
    pub currency: PaymentCurrency,
    pub note: String,
}

impl PaymentRequest {
    /// Request payment of a quote's customer total.
    pub fn for_quote(
        payee_handle: impl Into<String>,
        payee_name: impl Into<String>,
        job: &PrintJob,
        breakdown: &CostBreakdown,
    ) -> Self {
        Self {
            payee_handle: payee_handle.into(),
            payee_name: payee_name.into(),
            amount: breakdown.customer_total,
            currency: PaymentCurrency::INR,
            note: PrintNote::for_job(job).to_string(),
        }
    }

    pub fn to_uri(&self) -> String {
        build_payment_uri(
            &self.payee_handle,
            &self.payee_name,
            self.amount,
            self.currency,
            &self.note,
        )
    }
}

/// Build a `upi://pay` link.
///
/// The amount is written with two decimals and left out when it is not
/// positive. Empty payee fields are kept as empty parameters.
pub fn build_payment_uri(
    payee_handle: &str,
    payee_name: &str,
    amount: f64,
    currency: PaymentCurrency,
    note: &str,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("pa", payee_handle);
    query.append_pair("pn", payee_name);
    if amount.is_finite() && amount > 0.0 {
        query.append_pair("am", &format!("{:.2}", amount));
    }
    query.append_pair("cu", &currency.to_string());
    if !note.is_empty() {
        query.append_pair("tn", note);
    }
    format!("upi://pay?{}", query.finish())
}

/// Accepted payee handle shapes: a mobile number or `user@bank`.
const PAYEE_HANDLE_PATTERN: &str = r"^[0-9]+$|^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+$";

/// Check a payee handle: all digits (mobile number) or `user@bank`.
pub fn validate_payee_handle(handle: &str) -> PricingResult<()> {
    let pattern = Regex::new(PAYEE_HANDLE_PATTERN).map_err(|e| PricingError::InvalidValue {
        field: "payeeHandle".to_string(),
        message: e.to_string(),
    })?;
    if pattern.is_match(handle) {
        Ok(())
    } else {
        Err(PricingError::InvalidPayeeHandle(handle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute_rates;
    use crate::settings::RateSettings;

    #[test]
    fn test_payment_uri_layout() {
        let uri = build_payment_uri("shop@okbank", "Print Corner", 15.72, PaymentCurrency::INR, "PRINT-1S-BW-10P");
        assert_eq!(
            uri,
            "upi://pay?pa=shop%40okbank&pn=Print+Corner&am=15.72&cu=INR&tn=PRINT-1S-BW-10P"
        );
    }

    #[test]
    fn test_empty_handle_still_builds() {
        let uri = build_payment_uri("", "", 5.0, PaymentCurrency::INR, "");
        assert_eq!(uri, "upi://pay?pa=&pn=&am=5.00&cu=INR");
    }

    #[test]
    fn test_zero_amount_omitted() {
        let uri = build_payment_uri("9876543210", "Desk", 0.0, PaymentCurrency::INR, "PRINT-2S-CL-0P");
        assert!(!uri.contains("am="));
        assert!(uri.contains("cu=INR"));
    }

    #[test]
    fn test_note_is_derived_from_job() {
        let job = PrintJob::new(10, DuplexMode::OneSided, ColorMode::BlackAndWhite);
        assert_eq!(PrintNote::for_job(&job).to_string(), "PRINT-1S-BW-10P");

        let job = PrintJob::new(3, DuplexMode::TwoSided, ColorMode::Color);
        assert_eq!(PrintNote::for_job(&job).to_string(), "PRINT-2S-CL-3P");
    }

    #[test]
    fn test_note_parses_back() {
        let note: PrintNote = "PRINT-2S-CL-42P".parse().unwrap();
        assert_eq!(note.duplex, DuplexMode::TwoSided);
        assert_eq!(note.color, ColorMode::Color);
        assert_eq!(note.page_count, 42);

        assert!("PRINT-3S-BW-1P".parse::<PrintNote>().is_err());
        assert!("PRINT-1S-BW-1".parse::<PrintNote>().is_err());
        assert!("SCAN-1S-BW-1P".parse::<PrintNote>().is_err());
    }

    #[test]
    fn test_request_for_quote_uses_customer_total() {
        let settings = RateSettings::default();
        let job = PrintJob::new(10, DuplexMode::OneSided, ColorMode::BlackAndWhite);
        let breakdown = compute_rates(job.page_count, job.duplex, job.color, &settings);
        let request = PaymentRequest::for_quote("shop@upi", "Shop", &job, &breakdown);

        assert!(request.to_uri().contains("am=15.72"));
        assert!(request.to_uri().ends_with("tn=PRINT-1S-BW-10P"));
    }

    #[test]
    fn test_payee_handle_validation() {
        assert!(validate_payee_handle("9876543210").is_ok());
        assert!(validate_payee_handle("print.shop-1@okaxis").is_ok());
        assert!(validate_payee_handle("no-at-sign").is_err());
        assert!(validate_payee_handle("").is_err());
        assert!(validate_payee_handle("a@b c").is_err());
    }
}
