//! Pricing calculator - transparent cost, profit and discount breakdown.
//!
//! Paper and electricity are charged per physical sheet, ink and profit per
//! printed side. Intermediate values keep full precision; only
//! `ink_cost_per_page` is rounded (to cents) before it feeds the totals.
//! Formatting to fixed decimals happens in [`FormattedBreakdown`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::settings::RateSettings;

/// Whether pages are printed on one or both sides of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DuplexMode {
    #[default]
    #[serde(rename = "1-Sided")]
    OneSided,
    #[serde(rename = "2-Sided")]
    TwoSided,
}

impl DuplexMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneSided => "1-Sided",
            Self::TwoSided => "2-Sided",
        }
    }
}

impl fmt::Display for DuplexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DuplexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1-sided" | "1" | "single" | "simplex" => Ok(Self::OneSided),
            "2-sided" | "2" | "double" | "duplex" => Ok(Self::TwoSided),
            other => Err(format!("unknown duplex mode: {} (expected 1-Sided or 2-Sided)", other)),
        }
    }
}

/// Monochrome or colour printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    #[serde(rename = "Black & White")]
    BlackAndWhite,
    #[serde(rename = "Color")]
    Color,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlackAndWhite => "Black & White",
            Self::Color => "Color",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "black & white" | "bw" | "b&w" | "mono" | "monochrome" => Ok(Self::BlackAndWhite),
            "color" | "colour" => Ok(Self::Color),
            other => Err(format!("unknown color mode: {} (expected bw or color)", other)),
        }
    }
}

/// The inputs of one quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub page_count: i64,
    pub duplex: DuplexMode,
    pub color: ColorMode,
}

impl PrintJob {
    pub fn new(page_count: i64, duplex: DuplexMode, color: ColorMode) -> Self {
        Self {
            page_count,
            duplex,
            color,
        }
    }

    /// Price this job against the given settings.
    pub fn quote(&self, settings: &RateSettings) -> CostBreakdown {
        compute_rates(self.page_count, self.duplex, self.color, settings)
    }
}

/// Derived cost breakdown for one job. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    /// Paper cost of one physical sheet
    pub cost_per_page: f64,
    /// Ink cost of one printed side, rounded to cents
    pub ink_cost_per_page: f64,
    /// Physical sheets consumed
    pub sheets_used: u64,
    pub total_page_cost: f64,
    pub total_ink_cost: f64,
    pub total_electricity_cost: f64,
    pub internal_cost: f64,
    pub profit_per_print: f64,
    pub total_profit: f64,
    pub customer_total_before_discount: f64,
    pub discount_applied: f64,
    pub customer_total: f64,
    pub customer_cost_per_page: f64,
}

impl CostBreakdown {
    /// Whether this is the degenerate all-zero result.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Fixed-decimal rendering for display.
    pub fn formatted(&self) -> FormattedBreakdown {
        FormattedBreakdown {
            cost_per_page: format!("{:.3}", self.cost_per_page),
            ink_cost_per_page: format!("{:.4}", self.ink_cost_per_page),
            sheets_used: self.sheets_used.to_string(),
            total_page_cost: money(self.total_page_cost),
            total_ink_cost: money(self.total_ink_cost),
            total_electricity_cost: money(self.total_electricity_cost),
            internal_cost: money(self.internal_cost),
            profit_per_print: money(self.profit_per_print),
            total_profit: money(self.total_profit),
            customer_total_before_discount: money(self.customer_total_before_discount),
            discount_applied: money(self.discount_applied),
            customer_total: money(self.customer_total),
            customer_cost_per_page: money(self.customer_cost_per_page),
        }
    }
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

/// A [`CostBreakdown`] rendered at presentation precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedBreakdown {
    pub cost_per_page: String,
    pub ink_cost_per_page: String,
    pub sheets_used: String,
    pub total_page_cost: String,
    pub total_ink_cost: String,
    pub total_electricity_cost: String,
    pub internal_cost: String,
    pub profit_per_print: String,
    pub total_profit: String,
    pub customer_total_before_discount: String,
    pub discount_applied: String,
    pub customer_total: String,
    pub customer_cost_per_page: String,
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Physical sheets needed for `page_count` printed sides.
pub fn sheets_used(page_count: i64, duplex: DuplexMode) -> u64 {
    if page_count <= 0 {
        return 0;
    }
    let pages = page_count as u64;
    match duplex {
        DuplexMode::OneSided => pages,
        DuplexMode::TwoSided => pages.div_ceil(2),
    }
}

/// Ink cost of one printed side.
///
/// Colour pages draw on both the colour and the black bottle, so the colour
/// rate divides the combined bottle cost by the colour yield.
pub fn ink_cost_per_page(color: ColorMode, settings: &RateSettings) -> f64 {
    let raw = match color {
        ColorMode::BlackAndWhite => settings.black_ink.cost / f64::from(settings.black_ink.yield_pages),
        ColorMode::Color => {
            (settings.color_ink.cost + settings.black_ink.cost) / f64::from(settings.color_ink.yield_pages)
        }
    };
    round_to(raw, 2)
}

/// Margin per printed side.
///
/// A single page always uses the single-sided rate; the duplex rate only
/// applies once there is a second side to print.
pub fn profit_per_print(page_count: i64, duplex: DuplexMode, color: ColorMode, settings: &RateSettings) -> f64 {
    let rates = match color {
        ColorMode::BlackAndWhite => &settings.profit.black_and_white,
        ColorMode::Color => &settings.profit.color,
    };
    if page_count <= 1 {
        return rates.single_sided;
    }
    match duplex {
        DuplexMode::OneSided => rates.single_sided,
        DuplexMode::TwoSided => rates.double_sided,
    }
}

/// Compute the full breakdown for a job.
///
/// A zero or negative page count yields [`CostBreakdown::default`]. The
/// settings must satisfy [`RateSettings::validate`].
pub fn compute_rates(
    page_count: i64,
    duplex: DuplexMode,
    color: ColorMode,
    settings: &RateSettings,
) -> CostBreakdown {
    if page_count <= 0 {
        return CostBreakdown::default();
    }

    let pages = page_count as f64;
    let sheets = sheets_used(page_count, duplex);
    let sheets_f = sheets as f64;

    let cost_per_sheet = settings.page_cost.cost_per_sheet();
    let ink_per_page = ink_cost_per_page(color, settings);
    let profit_rate = profit_per_print(page_count, duplex, color, settings);

    let total_page_cost = sheets_f * cost_per_sheet;
    let total_ink_cost = ink_per_page * pages;
    let total_electricity_cost = sheets_f * settings.electricity;
    let internal_cost = total_page_cost + total_ink_cost + total_electricity_cost;

    let total_profit = pages * profit_rate;
    let customer_total_before_discount = internal_cost + total_profit;

    let discount_applied = if page_count >= i64::from(settings.discount.min_pages) {
        total_profit * (settings.discount.percentage / 100.0)
    } else {
        0.0
    };

    let customer_total = customer_total_before_discount - discount_applied;

    CostBreakdown {
        cost_per_page: cost_per_sheet,
        ink_cost_per_page: ink_per_page,
        sheets_used: sheets,
        total_page_cost,
        total_ink_cost,
        total_electricity_cost,
        internal_cost,
        profit_per_print: profit_rate,
        total_profit,
        customer_total_before_discount,
        discount_applied,
        customer_total,
        customer_cost_per_page: customer_total / pages,
    }
}

/// Turn raw user input into a page count.
///
/// Empty or non-numeric input becomes 0; fractional input is truncated.
pub fn parse_page_count(input: &str) -> i64 {
    let input = input.trim();
    if let Ok(n) = input.parse::<i64>() {
        return n;
    }
    match input.parse::<f64>() {
        Ok(n) if n.is_finite() => n.trunc() as i64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_worked_example_ten_pages_bw() {
        let settings = RateSettings::default();
        let b = compute_rates(10, DuplexMode::OneSided, ColorMode::BlackAndWhite, &settings);

        assert!(close(b.cost_per_page, 0.67));
        assert!(close(b.ink_cost_per_page, 0.12));
        assert_eq!(b.sheets_used, 10);
        assert!(close(b.total_page_cost, 6.70));
        assert!(close(b.total_ink_cost, 1.20));
        assert!(close(b.total_electricity_cost, 0.72));
        assert!(close(b.internal_cost, 8.62));
        assert!(close(b.profit_per_print, 0.71));
        assert!(close(b.total_profit, 7.10));
        assert_eq!(b.discount_applied, 0.0);
        assert!(close(b.customer_total, 15.72));
        assert!(close(b.customer_cost_per_page, 1.572));
    }

    #[test]
    fn test_non_positive_pages_yield_zero() {
        let settings = RateSettings::default();
        for pages in [0, -1, -250] {
            let b = compute_rates(pages, DuplexMode::TwoSided, ColorMode::Color, &settings);
            assert!(b.is_zero(), "pages = {}", pages);
        }
    }

    #[test]
    fn test_duplex_halves_sheets_rounding_up() {
        assert_eq!(sheets_used(7, DuplexMode::TwoSided), 4);
        assert_eq!(sheets_used(8, DuplexMode::TwoSided), 4);
        assert_eq!(sheets_used(7, DuplexMode::OneSided), 7);
        assert_eq!(sheets_used(1, DuplexMode::TwoSided), 1);
    }

    #[test]
    fn test_duplex_charges_ink_per_side_and_paper_per_sheet() {
        let settings = RateSettings::default();
        let b = compute_rates(9, DuplexMode::TwoSided, ColorMode::BlackAndWhite, &settings);

        assert_eq!(b.sheets_used, 5);
        assert!(close(b.total_page_cost, 5.0 * 0.67));
        assert!(close(b.total_ink_cost, 9.0 * 0.12));
        assert!(close(b.total_electricity_cost, 5.0 * 0.072));
        assert!(close(b.total_profit, 9.0 * 0.55));
    }

    #[test]
    fn test_single_page_uses_single_sided_profit() {
        let settings = RateSettings::default();
        for color in [ColorMode::BlackAndWhite, ColorMode::Color] {
            let one = compute_rates(1, DuplexMode::TwoSided, color, &settings);
            let expected = match color {
                ColorMode::BlackAndWhite => settings.profit.black_and_white.single_sided,
                ColorMode::Color => settings.profit.color.single_sided,
            };
            assert_eq!(one.profit_per_print, expected);
        }
    }

    #[test]
    fn test_color_ink_draws_on_both_bottles() {
        let settings = RateSettings::default();
        // (1260 + 570) / 1000 = 1.83
        assert!(close(ink_cost_per_page(ColorMode::Color, &settings), 1.83));
        // 570 / 4800 = 0.11875 -> 0.12
        assert!(close(ink_cost_per_page(ColorMode::BlackAndWhite, &settings), 0.12));
    }

    #[test]
    fn test_discount_applies_to_profit_only() {
        let settings = RateSettings::default();
        let b = compute_rates(200, DuplexMode::OneSided, ColorMode::BlackAndWhite, &settings);

        assert!(close(b.discount_applied, b.total_profit * 0.02));
        assert!(close(b.customer_total, b.internal_cost + b.total_profit - b.discount_applied));
        assert!(b.customer_total > b.internal_cost);
    }

    #[test]
    fn test_discount_starts_exactly_at_threshold() {
        let settings = RateSettings::default();
        let below = compute_rates(149, DuplexMode::OneSided, ColorMode::Color, &settings);
        let at = compute_rates(150, DuplexMode::OneSided, ColorMode::Color, &settings);
        assert_eq!(below.discount_applied, 0.0);
        assert!(at.discount_applied > 0.0);
    }

    #[test]
    fn test_breakdown_identities_hold() {
        let settings = RateSettings::default();
        for pages in [1, 2, 3, 10, 149, 150, 151, 1000] {
            for duplex in [DuplexMode::OneSided, DuplexMode::TwoSided] {
                for color in [ColorMode::BlackAndWhite, ColorMode::Color] {
                    let b = compute_rates(pages, duplex, color, &settings);
                    assert!(close(
                        b.internal_cost,
                        b.total_page_cost + b.total_ink_cost + b.total_electricity_cost
                    ));
                    assert!(close(b.customer_total_before_discount, b.internal_cost + b.total_profit));
                    assert!(close(b.customer_total, b.customer_total_before_discount - b.discount_applied));
                }
            }
        }
    }

    #[test]
    fn test_formatted_precision() {
        let settings = RateSettings::default();
        let f = compute_rates(10, DuplexMode::OneSided, ColorMode::BlackAndWhite, &settings).formatted();

        assert_eq!(f.cost_per_page, "0.670");
        assert_eq!(f.ink_cost_per_page, "0.1200");
        assert_eq!(f.internal_cost, "8.62");
        assert_eq!(f.customer_total, "15.72");
        assert_eq!(f.customer_cost_per_page, "1.57");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("2-Sided".parse::<DuplexMode>().unwrap(), DuplexMode::TwoSided);
        assert_eq!("single".parse::<DuplexMode>().unwrap(), DuplexMode::OneSided);
        assert_eq!("Black & White".parse::<ColorMode>().unwrap(), ColorMode::BlackAndWhite);
        assert_eq!("colour".parse::<ColorMode>().unwrap(), ColorMode::Color);
        assert!("triple".parse::<DuplexMode>().is_err());
    }

    #[test]
    fn test_mode_serde_names() {
        let job = PrintJob::new(3, DuplexMode::TwoSided, ColorMode::BlackAndWhite);
        let json = serde_json::to_value(job).unwrap();
        assert_eq!(json["duplex"], "2-Sided");
        assert_eq!(json["color"], "Black & White");
        assert_eq!(json["pageCount"], 3);
    }

    #[test]
    fn test_parse_page_count() {
        assert_eq!(parse_page_count("12"), 12);
        assert_eq!(parse_page_count(" 7 "), 7);
        assert_eq!(parse_page_count("3.9"), 3);
        assert_eq!(parse_page_count(""), 0);
        assert_eq!(parse_page_count("abc"), 0);
        assert_eq!(parse_page_count("-4"), -4);
    }
}
