//! Cost estimate calculations.
//!
//! Everything in this module is a pure function of its inputs. The same
//! functions back the live estimate shown while editing and the figures
//! written on save, so there is exactly one implementation of the pricing
//! rules.

pub mod common;
pub mod discount;
pub mod equipment;
pub mod hours;
pub mod tier_pricing;
pub mod totals;

pub use discount::VolumeDiscount;
pub use equipment::{EquipmentCost, EquipmentLine, equipment_cost};
pub use hours::{LabourHours, aggregate_hours};
pub use tier_pricing::{
    CostBreakdownLine, CostEstimateError, CostEstimateInput, CostEstimateResult, LabourCost,
    TierPricing, calculate_cost_estimate,
};
pub use totals::{Subtotal, Totals};
