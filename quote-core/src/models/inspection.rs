use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub id: i64,
    pub lead_id: i64,

    // Labour inputs
    pub no_demolition_hours: Option<Decimal>,
    pub demolition_hours: Option<Decimal>,
    pub subfloor_hours: Option<Decimal>,
    pub subfloor_treatment_minutes: Option<i64>,

    // Equipment inputs
    pub dehumidifier_qty: Option<i32>,
    pub air_mover_qty: Option<i32>,
    pub rcd_box_qty: Option<i32>,

    // Calculated values
    pub equipment_cost_ex_gst: Option<Decimal>,
    pub labor_cost_ex_gst: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub subtotal_ex_gst: Option<Decimal>,
    pub gst_amount: Option<Decimal>,
    pub total_inc_gst: Option<Decimal>,

    // Manual override
    pub manual_price_override: Option<bool>,
    pub manual_subtotal_ex_gst: Option<Decimal>,
    pub manual_total_inc_gst: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InspectionRecord {
    /// True when any stored cost figure is non-zero.
    ///
    /// A freshly created inspection has every cost column null or zero.
    pub fn has_cost_fields(&self) -> bool {
        [
            self.equipment_cost_ex_gst,
            self.labor_cost_ex_gst,
            self.subtotal_ex_gst,
            self.gst_amount,
            self.total_inc_gst,
        ]
        .iter()
        .any(|value| value.is_some_and(|v| !v.is_zero()))
    }
}

/// Values written on every save (no id or timestamps).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionFields {
    pub no_demolition_hours: Decimal,
    pub demolition_hours: Decimal,
    pub subfloor_hours: Decimal,
    pub subfloor_treatment_minutes: i64,
    pub dehumidifier_qty: i32,
    pub air_mover_qty: i32,
    pub rcd_box_qty: i32,
    pub equipment_cost_ex_gst: Decimal,
    pub labor_cost_ex_gst: Decimal,
    pub discount_percent: Decimal,
    pub subtotal_ex_gst: Decimal,
    pub gst_amount: Decimal,
    pub total_inc_gst: Decimal,
    pub manual_price_override: bool,
    pub manual_subtotal_ex_gst: Option<Decimal>,
    pub manual_total_inc_gst: Option<Decimal>,
}
