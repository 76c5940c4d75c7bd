//! Error types for the pricing engine.

use thiserror::Error;

/// Result type alias for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors raised at the edges of the pricing engine.
///
/// The calculator itself never fails; these cover settings editing,
/// persisted-settings decoding and currency lookup.
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Invalid rate settings: {field} must be greater than zero")]
    InvalidDenominator { field: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Unknown settings field: {0}")]
    UnknownField(String),

    #[error("Invalid payee handle format: {0}")]
    InvalidPayeeHandle(String),

    #[error("Invalid print note token: {0}")]
    InvalidNote(String),

    #[error("Settings decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Country lookup failed: {0}")]
    Lookup(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No currency known for country: {0}")]
    UnknownCountry(String),

    #[error("No display symbol for currency: {0}")]
    UnsupportedCurrency(String),
}
