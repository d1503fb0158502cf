//! Tier pricing calculator for labour, discount and GST.
//!
//! Each labour category has a two-point rate schedule: the price of a
//! 2-hour job and the price of a full 8-hour day. Hours are priced in day
//! blocks of up to 8 hours:
//!
//! | Block hours      | Block cost |
//! |------------------|------------|
//! | 0                | nothing    |
//! | up to 2          | 2h rate (minimum charge), or `hours × 2h rate / 2` when prorated |
//! | over 2, up to 8  | `2h rate + (hours − 2) / 6 × (8h rate − 2h rate)` |
//! | full 8-hour day  | 8h rate    |
//!
//! A job of more than 8 hours is split into full 8-hour days followed by a
//! final partial block, so `ceil(hours / 8)` blocks in total.
//!
//! The labour subtotal across all categories then receives the volume
//! discount for the total hours (see [`VolumeDiscount`]), equipment is added
//! on top of the discounted labour, and GST is derived from the rounded
//! subtotal.
//!
//! Per-block and per-category costs are kept exact. Rounding to cents
//! happens once, on the subtotal, so day-block sums never drift.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use quote_core::PricingConfig;
//! use quote_core::calculations::{CostEstimateInput, calculate_cost_estimate};
//!
//! let input = CostEstimateInput {
//!     non_demo_hours: dec!(10),
//!     demolition_hours: dec!(0),
//!     subfloor_hours: dec!(0),
//!     equipment_cost: dec!(0),
//!     manual_override: false,
//! };
//!
//! let result = calculate_cost_estimate(&PricingConfig::default(), &input).unwrap();
//!
//! assert_eq!(result.non_demo_breakdown.len(), 2);
//! assert_eq!(result.non_demo_cost, dec!(1828.99));
//! assert_eq!(result.discount_percent, dec!(0.075));
//! assert_eq!(result.subtotal_ex_gst, dec!(1691.82));
//! assert_eq!(result.gst_amount, dec!(169.18));
//! assert_eq!(result.total_inc_gst, dec!(1861.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{DAY_BLOCK_HOURS, day_count, round_half_up};
use crate::calculations::discount::VolumeDiscount;
use crate::calculations::hours::LabourHours;
use crate::calculations::totals::{Subtotal, Totals};
use crate::{LabourCategory, PricingConfig, RateSchedule, ShortJobPolicy};

const TIER_LOW_HOURS: i64 = 2;

/// Errors that can occur during cost estimate calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CostEstimateError {
    /// An hours or money input was negative.
    #[error("invalid {field}: {value} (must be non-negative)")]
    InvalidInput { field: &'static str, value: Decimal },

    /// An hours value was above the configured per-category limit.
    #[error("invalid {field}: {value} (must be at most {max})")]
    HoursOverLimit {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },
}

/// Input values for one estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimateInput {
    pub non_demo_hours: Decimal,
    pub demolition_hours: Decimal,
    pub subfloor_hours: Decimal,

    /// Equipment hire ex GST, added after the labour discount.
    pub equipment_cost: Decimal,

    /// When set, the caller supplies its own subtotal and the calculated one
    /// is only shown for comparison.
    pub manual_override: bool,
}

impl CostEstimateInput {
    pub fn from_hours(
        hours: &LabourHours,
        equipment_cost: Decimal,
        manual_override: bool,
    ) -> Self {
        Self {
            non_demo_hours: hours.non_demo,
            demolition_hours: hours.demolition,
            subfloor_hours: hours.subfloor,
            equipment_cost,
            manual_override,
        }
    }
}

/// One day block of a category's labour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdownLine {
    /// 1-based day number.
    pub day_index: u32,
    pub hours: Decimal,
    pub cost: Decimal,
    pub description: String,
}

/// Cost of one category and the day blocks it is made of.
///
/// `cost` is always the exact sum of the block costs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabourCost {
    pub cost: Decimal,
    pub breakdown: Vec<CostBreakdownLine>,
}

/// Full breakdown of an estimate.
///
/// Labour figures are exact; `subtotal_ex_gst`, `gst_amount` and
/// `total_inc_gst` are rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimateResult {
    pub non_demo_cost: Decimal,
    pub demolition_cost: Decimal,
    pub subfloor_cost: Decimal,
    pub non_demo_breakdown: Vec<CostBreakdownLine>,
    pub demolition_breakdown: Vec<CostBreakdownLine>,
    pub subfloor_breakdown: Vec<CostBreakdownLine>,

    /// Sum of the three category costs.
    pub labour_subtotal: Decimal,
    pub total_labour_hours: Decimal,
    /// `ceil(total_labour_hours / 8)`.
    pub total_days: u32,

    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub discount_tier_description: String,
    pub labour_after_discount: Decimal,

    pub equipment_cost: Decimal,
    pub subtotal_ex_gst: Decimal,
    pub gst_amount: Decimal,
    pub total_inc_gst: Decimal,

    /// True when the input asked for a manual override; the subtotal above
    /// is then for comparison only.
    pub subtotal_is_advisory: bool,
}

impl CostEstimateResult {
    pub fn cost(
        &self,
        category: LabourCategory,
    ) -> Decimal {
        match category {
            LabourCategory::NonDemo => self.non_demo_cost,
            LabourCategory::Demolition => self.demolition_cost,
            LabourCategory::Subfloor => self.subfloor_cost,
        }
    }

    pub fn breakdown(
        &self,
        category: LabourCategory,
    ) -> &[CostBreakdownLine] {
        match category {
            LabourCategory::NonDemo => &self.non_demo_breakdown,
            LabourCategory::Demolition => &self.demolition_breakdown,
            LabourCategory::Subfloor => &self.subfloor_breakdown,
        }
    }

    /// Discounted labour rounded for storage.
    pub fn rounded_labour_after_discount(&self) -> Decimal {
        round_half_up(self.labour_after_discount)
    }
}

/// Calculator bound to one set of rates.
#[derive(Debug, Clone)]
pub struct TierPricing<'a> {
    config: &'a PricingConfig,
}

impl<'a> TierPricing<'a> {
    pub fn new(config: &'a PricingConfig) -> Self {
        Self { config }
    }

    /// Calculates the complete estimate.
    ///
    /// # Errors
    ///
    /// * [`CostEstimateError::InvalidInput`] if any hours value or the
    ///   equipment cost is negative.
    /// * [`CostEstimateError::HoursOverLimit`] if a category's hours exceed
    ///   [`PricingConfig::max_hours_per_category`].
    pub fn calculate(
        &self,
        input: &CostEstimateInput,
    ) -> Result<CostEstimateResult, CostEstimateError> {
        self.validate(input)?;

        let non_demo = self.labour_cost(LabourCategory::NonDemo, input.non_demo_hours);
        let demolition = self.labour_cost(LabourCategory::Demolition, input.demolition_hours);
        let subfloor = self.labour_cost(LabourCategory::Subfloor, input.subfloor_hours);

        let labour_subtotal = non_demo.cost + demolition.cost + subfloor.cost;
        let total_labour_hours =
            input.non_demo_hours + input.demolition_hours + input.subfloor_hours;

        let discount = VolumeDiscount::for_hours(total_labour_hours);
        let discount_amount = labour_subtotal * discount.percent;
        let labour_after_discount = labour_subtotal - discount_amount;

        let totals = Totals::from_subtotal(
            Subtotal::Calculated(labour_after_discount + input.equipment_cost),
            self.config.gst_rate,
        );

        Ok(CostEstimateResult {
            non_demo_cost: non_demo.cost,
            demolition_cost: demolition.cost,
            subfloor_cost: subfloor.cost,
            non_demo_breakdown: non_demo.breakdown,
            demolition_breakdown: demolition.breakdown,
            subfloor_breakdown: subfloor.breakdown,
            labour_subtotal,
            total_labour_hours,
            total_days: day_count(total_labour_hours),
            discount_percent: discount.percent,
            discount_amount,
            discount_tier_description: discount.description.to_string(),
            labour_after_discount,
            equipment_cost: input.equipment_cost,
            subtotal_ex_gst: totals.subtotal_ex_gst,
            gst_amount: totals.gst_amount,
            total_inc_gst: totals.total_inc_gst,
            subtotal_is_advisory: input.manual_override,
        })
    }

    /// Prices one category's hours as a sequence of day blocks.
    ///
    /// Hours are not checked against the configured limit here; use
    /// [`calculate`](Self::calculate) for unchecked input.
    pub fn labour_cost(
        &self,
        category: LabourCategory,
        hours: Decimal,
    ) -> LabourCost {
        if hours <= Decimal::ZERO {
            return LabourCost::default();
        }

        let schedule = self.config.schedule(category);
        let day_hours = Decimal::from(DAY_BLOCK_HOURS);

        let mut breakdown = Vec::new();
        let mut cost = Decimal::ZERO;
        let mut remaining = hours;
        let mut day_index = 1;

        while remaining > day_hours {
            cost += schedule.tier_8h;
            breakdown.push(CostBreakdownLine {
                day_index,
                hours: day_hours,
                cost: schedule.tier_8h,
                description: describe_block(day_index, day_hours, schedule.tier_8h, ""),
            });
            remaining -= day_hours;
            day_index += 1;
        }

        let block = self.block_cost(&schedule, remaining);
        cost += block;
        breakdown.push(CostBreakdownLine {
            day_index,
            hours: remaining,
            cost: block,
            description: describe_block(day_index, remaining, block, self.block_note(remaining)),
        });

        LabourCost { cost, breakdown }
    }

    /// Cost of a single block of `0 < hours <= 8`.
    fn block_cost(
        &self,
        schedule: &RateSchedule,
        hours: Decimal,
    ) -> Decimal {
        let low_hours = Decimal::from(TIER_LOW_HOURS);

        if hours <= low_hours {
            return match self.config.short_job {
                ShortJobPolicy::MinimumCharge => schedule.tier_2h,
                ShortJobPolicy::Prorated => hours * schedule.tier_2h / low_hours,
            };
        }

        let span = Decimal::from(DAY_BLOCK_HOURS - TIER_LOW_HOURS);
        schedule.tier_2h + (hours - low_hours) * (schedule.tier_8h - schedule.tier_2h) / span
    }

    fn block_note(
        &self,
        hours: Decimal,
    ) -> &'static str {
        if hours >= Decimal::from(DAY_BLOCK_HOURS) {
            ""
        } else if hours <= Decimal::from(TIER_LOW_HOURS) {
            match self.config.short_job {
                ShortJobPolicy::MinimumCharge => " (2h minimum)",
                ShortJobPolicy::Prorated => " (prorated)",
            }
        } else {
            " (interpolated)"
        }
    }

    fn validate(
        &self,
        input: &CostEstimateInput,
    ) -> Result<(), CostEstimateError> {
        let hours = [
            ("non_demo_hours", input.non_demo_hours),
            ("demolition_hours", input.demolition_hours),
            ("subfloor_hours", input.subfloor_hours),
        ];
        let negative = hours
            .into_iter()
            .chain([("equipment_cost", input.equipment_cost)])
            .find(|(_, value)| value.is_sign_negative() && !value.is_zero());

        if let Some((field, value)) = negative {
            return Err(CostEstimateError::InvalidInput { field, value });
        }

        let max = self.config.max_hours_per_category;
        match hours.into_iter().find(|(_, value)| *value > max) {
            Some((field, value)) => Err(CostEstimateError::HoursOverLimit { field, value, max }),
            None => Ok(()),
        }
    }
}

/// Calculates an estimate with the given rates.
///
/// Pure and deterministic; cheap enough to run on every edit.
pub fn calculate_cost_estimate(
    config: &PricingConfig,
    input: &CostEstimateInput,
) -> Result<CostEstimateResult, CostEstimateError> {
    TierPricing::new(config).calculate(input)
}

fn describe_block(
    day_index: u32,
    hours: Decimal,
    cost: Decimal,
    note: &str,
) -> String {
    format!(
        "Day {day_index}: {}h -> ${:.2}{note}",
        hours.normalize(),
        round_half_up(cost)
    )
}
