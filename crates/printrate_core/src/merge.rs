//! Structural merge of persisted settings onto defaults.
//!
//! Persisted blobs are decoded into [`RateSettingsPatch`], a mirror of
//! [`RateSettings`] in which every field is optional. Merging walks the closed
//! schema: object-typed fields recurse into their nested patch, scalar fields
//! are replaced when present, and anything absent keeps the default. Keys the
//! schema does not know are ignored so blobs from older releases still load.
//!
//! Numeric fields accept either JSON numbers or numeric strings, since older
//! front ends persisted raw form input. An empty string counts as absent.

use serde::{Deserialize, Serialize};

use crate::error::PricingResult;
use crate::settings::{Discount, InkCost, PageCost, ProfitRates, ProfitTable, RateSettings};

/// Types that can absorb a partial overlay of themselves.
pub trait Merge {
    type Patch;

    /// Apply every field present in `patch`, keeping the rest.
    fn merge_from(&mut self, patch: &Self::Patch);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCostPatch {
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkCostPatch {
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(
        rename = "yield",
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub yield_pages: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitRatesPatch {
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub single_sided: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub double_sided: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitTablePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_and_white: Option<ProfitRatesPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ProfitRatesPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPatch {
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub min_pages: Option<u32>,
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// A persisted, possibly partial or outdated, settings record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSettingsPatch {
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_cost: Option<PageCostPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_ink: Option<InkCostPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_ink: Option<InkCostPatch>,
    #[serde(default, deserialize_with = "lenient::amount", skip_serializing_if = "Option::is_none")]
    pub electricity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<ProfitTablePatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_internal_cost: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_unit: Option<String>,
}

impl RateSettingsPatch {
    /// Decode a persisted JSON blob.
    pub fn from_json(raw: &str) -> PricingResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn overlay<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

fn overlay_nested<T: Merge>(slot: &mut T, patch: &Option<T::Patch>) {
    if let Some(p) = patch {
        slot.merge_from(p);
    }
}

impl Merge for PageCost {
    type Patch = PageCostPatch;

    fn merge_from(&mut self, patch: &PageCostPatch) {
        overlay(&mut self.cost, &patch.cost);
        overlay(&mut self.pages, &patch.pages);
    }
}

impl Merge for InkCost {
    type Patch = InkCostPatch;

    fn merge_from(&mut self, patch: &InkCostPatch) {
        overlay(&mut self.cost, &patch.cost);
        overlay(&mut self.yield_pages, &patch.yield_pages);
    }
}

impl Merge for ProfitRates {
    type Patch = ProfitRatesPatch;

    fn merge_from(&mut self, patch: &ProfitRatesPatch) {
        overlay(&mut self.single_sided, &patch.single_sided);
        overlay(&mut self.double_sided, &patch.double_sided);
    }
}

impl Merge for ProfitTable {
    type Patch = ProfitTablePatch;

    fn merge_from(&mut self, patch: &ProfitTablePatch) {
        overlay_nested(&mut self.black_and_white, &patch.black_and_white);
        overlay_nested(&mut self.color, &patch.color);
    }
}

impl Merge for Discount {
    type Patch = DiscountPatch;

    fn merge_from(&mut self, patch: &DiscountPatch) {
        overlay(&mut self.min_pages, &patch.min_pages);
        overlay(&mut self.percentage, &patch.percentage);
    }
}

impl Merge for RateSettings {
    type Patch = RateSettingsPatch;

    fn merge_from(&mut self, patch: &RateSettingsPatch) {
        overlay(&mut self.version, &patch.version);
        overlay_nested(&mut self.page_cost, &patch.page_cost);
        overlay_nested(&mut self.black_ink, &patch.black_ink);
        overlay_nested(&mut self.color_ink, &patch.color_ink);
        overlay(&mut self.electricity, &patch.electricity);
        overlay_nested(&mut self.profit, &patch.profit);
        overlay_nested(&mut self.discount, &patch.discount);
        overlay(&mut self.show_internal_cost, &patch.show_internal_cost);
        overlay(&mut self.currency_unit, &patch.currency_unit);
    }
}

/// Overlay `persisted` onto a copy of `defaults`.
pub fn merge_settings(defaults: &RateSettings, persisted: &RateSettingsPatch) -> RateSettings {
    let mut merged = defaults.clone();
    merged.merge_from(persisted);
    merged
}

impl From<&RateSettings> for RateSettingsPatch {
    fn from(s: &RateSettings) -> Self {
        let rates = |r: &ProfitRates| ProfitRatesPatch {
            single_sided: Some(r.single_sided),
            double_sided: Some(r.double_sided),
        };
        let ink = |i: &InkCost| InkCostPatch {
            cost: Some(i.cost),
            yield_pages: Some(i.yield_pages),
        };
        Self {
            version: Some(s.version),
            page_cost: Some(PageCostPatch {
                cost: Some(s.page_cost.cost),
                pages: Some(s.page_cost.pages),
            }),
            black_ink: Some(ink(&s.black_ink)),
            color_ink: Some(ink(&s.color_ink)),
            electricity: Some(s.electricity),
            profit: Some(ProfitTablePatch {
                black_and_white: Some(rates(&s.profit.black_and_white)),
                color: Some(rates(&s.profit.color)),
            }),
            discount: Some(DiscountPatch {
                min_pages: Some(s.discount.min_pages),
                percentage: Some(s.discount.percentage),
            }),
            show_internal_cost: Some(s.show_internal_cost),
            currency_unit: Some(s.currency_unit.clone()),
        }
    }
}

mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = match Option::<NumberOrText>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(NumberOrText::Number(n)) => n,
            Some(NumberOrText::Text(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                text.parse::<f64>()
                    .map_err(|_| D::Error::custom(format!("expected a number, found {:?}", text)))?
            }
        };
        if !value.is_finite() {
            return Err(D::Error::custom("expected a finite number"));
        }
        Ok(Some(value))
    }

    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        number(deserializer)
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        match number(deserializer)? {
            None => Ok(None),
            Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => Ok(Some(n as u32)),
            Some(n) => Err(D::Error::custom(format!("expected a whole number, found {}", n))),
        }
    }
}
