//! # printrate_core - Print cost pricing engine
//!
//! This crate computes what a print job costs the shop and what it charges
//! the customer:
//! - Configurable rate settings (paper, ink, electricity, margins, bulk discount)
//! - Structural merge of persisted settings onto the current defaults
//! - Cost breakdown per job, recomputed on every input change
//! - UPI payment links carrying a self-describing transaction note
//! - Background currency detection with a fixed fallback symbol
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   merge    ┌─────────────────┐
//! │ Persisted patch │──────────▶│  RateSettings   │
//! └─────────────────┘            └────────┬────────┘
//!                                         │ &settings
//!      ┌──────────────┐          ┌────────▼────────┐
//!      │   PrintJob   │─────────▶│  compute_rates  │
//!      └──────────────┘          └────────┬────────┘
//!                                         │ CostBreakdown
//!                                ┌────────▼────────┐
//!                                │ PaymentRequest  │──▶ upi://pay?...
//!                                └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use printrate_core::{compute_rates, ColorMode, DuplexMode, RateSettings};
//!
//! let settings = RateSettings::default();
//! let quote = compute_rates(10, DuplexMode::OneSided, ColorMode::BlackAndWhite, &settings);
//! assert_eq!(quote.formatted().customer_total, "15.72");
//! ```

pub mod calculator;
pub mod currency;
pub mod error;
pub mod merge;
pub mod payment;
pub mod settings;

pub use calculator::*;
pub use currency::*;
pub use error::*;
pub use merge::*;
pub use payment::*;
pub use settings::*;
