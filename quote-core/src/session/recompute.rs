//! Derived-field recomputation for the estimate form.
//!
//! [`price_form`] is the one place that turns form inputs into priced
//! figures; both the live edit path and the save path call it. The gated
//! entry points [`sync_hours`] and [`reprice`] take the session's
//! [`LoadPhase`] and do nothing until it is `Ready`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::form::{EstimateForm, PricedFields};
use super::lifecycle::LoadPhase;
use crate::calculations::common::round_half_up;
use crate::calculations::{
    CostEstimateError, CostEstimateInput, CostEstimateResult, EquipmentCost, Subtotal, Totals,
    aggregate_hours, calculate_cost_estimate, equipment_cost,
};
use crate::{EquipmentQuantities, InspectionRecord, PricingConfig};

/// Everything one pricing pass produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPricing {
    /// Labour estimate, priced without equipment.
    pub estimate: CostEstimateResult,
    pub equipment: EquipmentCost,
    pub fields: PricedFields,
}

/// Prices the form's current hours and equipment.
///
/// Equipment is priced separately and added after the labour discount, so
/// the calculator always sees an equipment cost of zero. A manual subtotal
/// already held by the form stays authoritative; GST and total are derived
/// from whichever subtotal applies.
pub fn price_form(
    form: &EstimateForm,
    config: &PricingConfig,
) -> Result<FormPricing, CostEstimateError> {
    let hours = form.hours();
    let manual = form.pricing().subtotal.is_manual();

    let estimate = calculate_cost_estimate(
        config,
        &CostEstimateInput::from_hours(&hours, Decimal::ZERO, manual),
    )?;
    let equipment = equipment_cost(&form.equipment(), config, hours.total());

    let subtotal = match form.pricing().subtotal {
        Subtotal::Manual(value) => Subtotal::Manual(value),
        Subtotal::Calculated(_) => {
            Subtotal::Calculated(round_half_up(estimate.labour_after_discount + equipment.total))
        }
    };
    let totals = Totals::from_subtotal(subtotal, config.gst_rate);

    let fields = PricedFields {
        equipment_cost_ex_gst: round_half_up(equipment.total),
        labour_cost_ex_gst: estimate.rounded_labour_after_discount(),
        discount_percent: estimate.discount_percent,
        subtotal,
        gst_amount: totals.gst_amount,
        total_inc_gst: totals.total_inc_gst,
    };

    Ok(FormPricing {
        estimate,
        equipment,
        fields,
    })
}

/// Re-derives category hours from the area list.
///
/// Returns `true` when the held hours changed. Does nothing while loading,
/// and writes nothing when the derived hours equal the held ones.
pub fn sync_hours(
    phase: LoadPhase,
    form: &mut EstimateForm,
) -> bool {
    if !phase.is_ready() {
        debug!("skipping hours aggregation while loading");
        return false;
    }

    let derived = aggregate_hours(form.areas(), form.subfloor_treatment_hours());
    if derived == form.hours {
        return false;
    }

    debug!(
        non_demo = %derived.non_demo,
        demolition = %derived.demolition,
        subfloor = %derived.subfloor,
        "labour hours re-derived from areas"
    );
    form.hours = derived;
    true
}

/// Re-prices the form in place.
///
/// Returns `Ok(true)` when any priced figure changed. Does nothing while
/// loading.
pub fn reprice(
    phase: LoadPhase,
    form: &mut EstimateForm,
    config: &PricingConfig,
) -> Result<bool, CostEstimateError> {
    if !phase.is_ready() {
        debug!("skipping repricing while loading");
        return Ok(false);
    }

    let pricing = price_form(form, config)?;
    if pricing.fields == form.pricing {
        return Ok(false);
    }

    debug!(
        subtotal = %pricing.fields.subtotal.amount(),
        manual = pricing.fields.subtotal.is_manual(),
        total = %pricing.fields.total_inc_gst,
        "estimate repriced"
    );
    form.pricing = pricing.fields;
    Ok(true)
}

/// What to do with freshly loaded figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconciliation {
    /// Nothing stored yet, or no cost column was ever filled in.
    NewInspection,
    /// Equipment is booked but its stored cost is zero.
    StaleEquipmentCost,
    /// Stored figures are used as they are.
    Trusted,
}

impl Reconciliation {
    pub fn needs_recompute(self) -> bool {
        !matches!(self, Self::Trusted)
    }
}

/// Decides whether a loaded inspection gets one corrective recompute.
pub fn reconciliation_for(record: Option<&InspectionRecord>) -> Reconciliation {
    let Some(record) = record else {
        return Reconciliation::NewInspection;
    };

    if !record.has_cost_fields() {
        return Reconciliation::NewInspection;
    }

    let booked = [record.dehumidifier_qty, record.air_mover_qty, record.rcd_box_qty]
        .iter()
        .any(|qty| qty.is_some_and(|q| q > 0));
    let stored_cost = record.equipment_cost_ex_gst.unwrap_or_default();

    if booked && stored_cost.is_zero() {
        Reconciliation::StaleEquipmentCost
    } else {
        Reconciliation::Trusted
    }
}

/// Booked equipment whose stored cost was zero. Corrected by a recompute,
/// never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleDataWarning {
    pub inspection_id: i64,
    pub quantities: EquipmentQuantities,
    pub stored_equipment_cost: Decimal,
}
