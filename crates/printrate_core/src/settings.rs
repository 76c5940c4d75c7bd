//! Rate settings - the configurable cost model.
//!
//! A [`RateSettings`] value is built from [`RateSettings::default`], optionally
//! overlaid with a persisted patch (see [`crate::merge`]), and edited only
//! through [`RateSettings::set_field`]. It is passed by reference into the
//! calculator and never shared mutably.

use serde::{Deserialize, Serialize};

use crate::error::{PricingError, PricingResult};

/// Current schema tag written into new settings blobs.
pub const SETTINGS_VERSION: u32 = 1;

/// Fallback currency symbol when detection is unavailable.
pub const FALLBACK_CURRENCY_SYMBOL: &str = "₹";

/// Cost of a ream of paper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCost {
    /// Price of the ream
    pub cost: f64,
    /// Sheets in the ream
    pub pages: u32,
}

impl PageCost {
    /// Paper cost of one physical sheet.
    pub fn cost_per_sheet(&self) -> f64 {
        self.cost / f64::from(self.pages)
    }
}

/// Cost and yield of an ink bottle or cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkCost {
    /// Price of the bottle
    pub cost: f64,
    /// Pages printed before the bottle runs out
    #[serde(rename = "yield")]
    pub yield_pages: u32,
}

/// Profit per printed page for one colour mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitRates {
    pub single_sided: f64,
    pub double_sided: f64,
}

/// Profit margins keyed by colour mode, then duplex mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitTable {
    pub black_and_white: ProfitRates,
    pub color: ProfitRates,
}

/// Bulk discount on the profit component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    /// Page count at which the discount starts
    pub min_pages: u32,
    /// Percentage of the total profit taken off
    pub percentage: f64,
}

/// The full print-cost model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSettings {
    /// Schema tag for future migrations
    pub version: u32,
    pub page_cost: PageCost,
    pub black_ink: InkCost,
    pub color_ink: InkCost,
    /// Electricity cost per physical sheet
    pub electricity: f64,
    pub profit: ProfitTable,
    pub discount: Discount,
    /// Display toggle for the internal cost table
    pub show_internal_cost: bool,
    /// Currency symbol used when rendering amounts
    pub currency_unit: String,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            page_cost: PageCost {
                cost: 335.0,
                pages: 500,
            },
            black_ink: InkCost {
                cost: 570.0,
                yield_pages: 4800,
            },
            color_ink: InkCost {
                cost: 1260.0,
                yield_pages: 1000,
            },
            electricity: 0.072,
            profit: ProfitTable {
                black_and_white: ProfitRates {
                    single_sided: 0.71,
                    double_sided: 0.55,
                },
                color: ProfitRates {
                    single_sided: 2.50,
                    double_sided: 2.00,
                },
            },
            discount: Discount {
                min_pages: 150,
                percentage: 2.0,
            },
            show_internal_cost: false,
            currency_unit: FALLBACK_CURRENCY_SYMBOL.to_string(),
        }
    }
}

/// Editable field paths, in display order.
pub const SETTINGS_FIELDS: &[&str] = &[
    "pageCost.cost",
    "pageCost.pages",
    "blackInk.cost",
    "blackInk.yield",
    "colorInk.cost",
    "colorInk.yield",
    "electricity",
    "profit.blackAndWhite.singleSided",
    "profit.blackAndWhite.doubleSided",
    "profit.color.singleSided",
    "profit.color.doubleSided",
    "discount.minPages",
    "discount.percentage",
    "showInternalCost",
    "currencyUnit",
];

impl RateSettings {
    /// Check the invariants the calculator relies on.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> PricingResult<()> {
        let denominators = [
            ("pageCost.pages", self.page_cost.pages),
            ("blackInk.yield", self.black_ink.yield_pages),
            ("colorInk.yield", self.color_ink.yield_pages),
        ];
        for (field, value) in denominators {
            if value == 0 {
                return Err(PricingError::InvalidDenominator {
                    field: field.to_string(),
                });
            }
        }

        let amounts = [
            ("pageCost.cost", self.page_cost.cost),
            ("blackInk.cost", self.black_ink.cost),
            ("colorInk.cost", self.color_ink.cost),
            ("electricity", self.electricity),
            ("profit.blackAndWhite.singleSided", self.profit.black_and_white.single_sided),
            ("profit.blackAndWhite.doubleSided", self.profit.black_and_white.double_sided),
            ("profit.color.singleSided", self.profit.color.single_sided),
            ("profit.color.doubleSided", self.profit.color.double_sided),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(PricingError::InvalidValue {
                    field: field.to_string(),
                    message: format!("expected a non-negative amount, got {}", value),
                });
            }
        }

        let pct = self.discount.percentage;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(PricingError::InvalidValue {
                field: "discount.percentage".to_string(),
                message: format!("expected 0-100, got {}", pct),
            });
        }

        Ok(())
    }

    /// Set a single field from its dotted path and textual value.
    ///
    /// Only parses; call [`validate`](Self::validate) before persisting.
    pub fn set_field(&mut self, path: &str, value: &str) -> PricingResult<()> {
        let value = value.trim();
        match path {
            "pageCost.cost" => self.page_cost.cost = parse_amount(path, value)?,
            "pageCost.pages" => self.page_cost.pages = parse_count(path, value)?,
            "blackInk.cost" => self.black_ink.cost = parse_amount(path, value)?,
            "blackInk.yield" => self.black_ink.yield_pages = parse_count(path, value)?,
            "colorInk.cost" => self.color_ink.cost = parse_amount(path, value)?,
            "colorInk.yield" => self.color_ink.yield_pages = parse_count(path, value)?,
            "electricity" => self.electricity = parse_amount(path, value)?,
            "profit.blackAndWhite.singleSided" => {
                self.profit.black_and_white.single_sided = parse_amount(path, value)?
            }
            "profit.blackAndWhite.doubleSided" => {
                self.profit.black_and_white.double_sided = parse_amount(path, value)?
            }
            "profit.color.singleSided" => self.profit.color.single_sided = parse_amount(path, value)?,
            "profit.color.doubleSided" => self.profit.color.double_sided = parse_amount(path, value)?,
            "discount.minPages" => self.discount.min_pages = parse_count(path, value)?,
            "discount.percentage" => self.discount.percentage = parse_amount(path, value)?,
            "showInternalCost" => self.show_internal_cost = parse_flag(path, value)?,
            "currencyUnit" => {
                if value.is_empty() {
                    return Err(PricingError::InvalidValue {
                        field: path.to_string(),
                        message: "currency symbol cannot be empty".to_string(),
                    });
                }
                self.currency_unit = value.to_string();
            }
            other => return Err(PricingError::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

fn parse_amount(field: &str, value: &str) -> PricingResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PricingError::InvalidValue {
            field: field.to_string(),
            message: format!("expected a number, got {:?}", value),
        })
}

fn parse_count(field: &str, value: &str) -> PricingResult<u32> {
    value.parse::<u32>().map_err(|_| PricingError::InvalidValue {
        field: field.to_string(),
        message: format!("expected a whole number, got {:?}", value),
    })
}

fn parse_flag(field: &str, value: &str) -> PricingResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(PricingError::InvalidValue {
            field: field.to_string(),
            message: format!("expected true or false, got {:?}", value),
        }),
    }
}
