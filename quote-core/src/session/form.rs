//! The single in-memory copy of an inspection's estimate inputs and priced
//! figures.
//!
//! Fields are only written through [`EstimateSession`](super::EstimateSession)
//! edit events, the load routine, and the gated recompute functions in
//! [`recompute`](super::recompute).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::calculations::totals::ex_gst_from_inc_gst;
use crate::calculations::{CostEstimateError, LabourHours, Subtotal, Totals};
use crate::models::area::{hours_to_minutes, minutes_to_hours};
use crate::{
    AreaKey, AreaRecord, EquipmentQuantities, InspectionArea, InspectionFields, InspectionRecord,
};

/// Priced figures as held by the form and written to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedFields {
    pub equipment_cost_ex_gst: Decimal,
    /// Labour after the volume discount, rounded to cents.
    pub labour_cost_ex_gst: Decimal,
    pub discount_percent: Decimal,
    pub subtotal: Subtotal,
    pub gst_amount: Decimal,
    pub total_inc_gst: Decimal,
}

impl PricedFields {
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal_ex_gst: self.subtotal.amount(),
            gst_amount: self.gst_amount,
            total_inc_gst: self.total_inc_gst,
        }
    }
}

/// A partial edit of one area. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaUpdate {
    pub name: Option<String>,
    pub time_without_demo: Option<Decimal>,
    pub demolition_required: Option<bool>,
    pub demolition_time: Option<Decimal>,
}

impl AreaUpdate {
    pub fn validate(&self) -> Result<(), CostEstimateError> {
        check_non_negative("time_without_demo", self.time_without_demo)?;
        check_non_negative("demolition_time", self.demolition_time)
    }

    fn apply(
        self,
        area: &mut InspectionArea,
    ) {
        if let Some(name) = self.name {
            area.name = name;
        }
        if let Some(hours) = self.time_without_demo {
            area.time_without_demo = hours;
        }
        if let Some(required) = self.demolition_required {
            area.demolition_required = required;
        }
        if let Some(hours) = self.demolition_time {
            area.demolition_time = hours;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstimateForm {
    pub(crate) inspection_id: Option<i64>,
    pub(crate) areas: Vec<InspectionArea>,
    /// Stored areas the user removed, deleted from the store on next save.
    pub(crate) removed_area_ids: Vec<i64>,
    next_key: u64,
    pub(crate) subfloor_treatment_hours: Decimal,
    pub(crate) hours: LabourHours,
    pub(crate) equipment: EquipmentQuantities,
    pub(crate) pricing: PricedFields,
    pub(crate) dirty: bool,
}

impl EstimateForm {
    /// Builds a form from stored values, copying every figure as stored.
    ///
    /// Null columns read as zero. A manual override without a stored ex-GST
    /// value falls back to the inc-GST manual total, then to the stored
    /// subtotal. A negative equipment quantity is rejected.
    pub fn from_stored(
        record: &InspectionRecord,
        areas: &[AreaRecord],
        gst_rate: Decimal,
    ) -> Result<Self, CostEstimateError> {
        let equipment = EquipmentQuantities {
            dehumidifiers: stored_quantity("dehumidifier_qty", record.dehumidifier_qty)?,
            air_movers: stored_quantity("air_mover_qty", record.air_mover_qty)?,
            rcd_boxes: stored_quantity("rcd_box_qty", record.rcd_box_qty)?,
        };

        let mut ordered: Vec<&AreaRecord> = areas.iter().collect();
        ordered.sort_by_key(|area| area.area_order);

        let areas: Vec<InspectionArea> = ordered
            .into_iter()
            .enumerate()
            .map(|(index, area)| InspectionArea::from_record(AreaKey(index as u64), area))
            .collect();

        let subtotal = if record.manual_price_override == Some(true) {
            let manual = record
                .manual_subtotal_ex_gst
                .or_else(|| {
                    record
                        .manual_total_inc_gst
                        .map(|total| ex_gst_from_inc_gst(total, gst_rate))
                })
                .or(record.subtotal_ex_gst)
                .unwrap_or_default();
            Subtotal::Manual(manual)
        } else {
            Subtotal::Calculated(record.subtotal_ex_gst.unwrap_or_default())
        };

        Ok(Self {
            inspection_id: Some(record.id),
            next_key: areas.len() as u64,
            areas,
            removed_area_ids: Vec::new(),
            subfloor_treatment_hours: minutes_to_hours(
                record.subfloor_treatment_minutes.unwrap_or_default(),
            ),
            hours: LabourHours {
                non_demo: record.no_demolition_hours.unwrap_or_default(),
                demolition: record.demolition_hours.unwrap_or_default(),
                subfloor: record.subfloor_hours.unwrap_or_default(),
            },
            equipment,
            pricing: PricedFields {
                equipment_cost_ex_gst: record.equipment_cost_ex_gst.unwrap_or_default(),
                labour_cost_ex_gst: record.labor_cost_ex_gst.unwrap_or_default(),
                discount_percent: record.discount_percent.unwrap_or_default(),
                subtotal,
                gst_amount: record.gst_amount.unwrap_or_default(),
                total_inc_gst: record.total_inc_gst.unwrap_or_default(),
            },
            dirty: false,
        })
    }

    /// A form holding only hours and equipment, for quoting without areas
    /// or a store. Price it with [`price_form`](super::price_form).
    pub fn quick_quote(
        hours: LabourHours,
        equipment: EquipmentQuantities,
        manual: Option<Decimal>,
    ) -> Result<Self, CostEstimateError> {
        check_non_negative("manual_subtotal", manual)?;

        Ok(Self {
            hours,
            equipment,
            pricing: PricedFields {
                subtotal: manual.map(manual_subtotal).unwrap_or_default(),
                ..PricedFields::default()
            },
            ..Self::default()
        })
    }

    /// The row written on save, with `pricing` as the priced figures.
    pub fn to_fields(
        &self,
        pricing: &PricedFields,
    ) -> InspectionFields {
        let manual = pricing.subtotal.is_manual();

        InspectionFields {
            no_demolition_hours: self.hours.non_demo,
            demolition_hours: self.hours.demolition,
            subfloor_hours: self.hours.subfloor,
            subfloor_treatment_minutes: hours_to_minutes(self.subfloor_treatment_hours),
            dehumidifier_qty: column_quantity(self.equipment.dehumidifiers),
            air_mover_qty: column_quantity(self.equipment.air_movers),
            rcd_box_qty: column_quantity(self.equipment.rcd_boxes),
            equipment_cost_ex_gst: pricing.equipment_cost_ex_gst,
            labor_cost_ex_gst: pricing.labour_cost_ex_gst,
            discount_percent: pricing.discount_percent,
            subtotal_ex_gst: pricing.subtotal.amount(),
            gst_amount: pricing.gst_amount,
            total_inc_gst: pricing.total_inc_gst,
            manual_price_override: manual,
            manual_subtotal_ex_gst: manual.then(|| pricing.subtotal.amount()),
            manual_total_inc_gst: manual.then_some(pricing.total_inc_gst),
        }
    }

    pub fn inspection_id(&self) -> Option<i64> {
        self.inspection_id
    }

    pub fn areas(&self) -> &[InspectionArea] {
        &self.areas
    }

    pub fn area(
        &self,
        key: AreaKey,
    ) -> Option<&InspectionArea> {
        self.areas.iter().find(|area| area.key == key)
    }

    pub fn removed_area_ids(&self) -> &[i64] {
        &self.removed_area_ids
    }

    pub fn subfloor_treatment_hours(&self) -> Decimal {
        self.subfloor_treatment_hours
    }

    pub fn hours(&self) -> LabourHours {
        self.hours
    }

    pub fn equipment(&self) -> EquipmentQuantities {
        self.equipment
    }

    pub fn pricing(&self) -> &PricedFields {
        &self.pricing
    }

    pub fn is_manual_override(&self) -> bool {
        self.pricing.subtotal.is_manual()
    }

    /// True when there are edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn push_area(&mut self) -> AreaKey {
        let key = AreaKey(self.next_key);
        self.next_key += 1;
        self.areas.push(InspectionArea::new(key));
        key
    }

    pub(crate) fn update_area(
        &mut self,
        key: AreaKey,
        update: AreaUpdate,
    ) -> bool {
        match self.areas.iter_mut().find(|area| area.key == key) {
            Some(area) => {
                update.apply(area);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_area(
        &mut self,
        key: AreaKey,
    ) -> bool {
        let Some(index) = self.areas.iter().position(|area| area.key == key) else {
            return false;
        };
        let area = self.areas.remove(index);
        if let Some(id) = area.id {
            self.removed_area_ids.push(id);
        }
        true
    }
}

pub(crate) fn check_non_negative(
    field: &'static str,
    value: Option<Decimal>,
) -> Result<(), CostEstimateError> {
    match value {
        Some(value) if value.is_sign_negative() && !value.is_zero() => {
            Err(CostEstimateError::InvalidInput { field, value })
        }
        _ => Ok(()),
    }
}

/// Rounds a manual subtotal to cents before it becomes authoritative.
pub(crate) fn manual_subtotal(value: Decimal) -> Subtotal {
    Subtotal::Manual(round_half_up(value))
}

fn stored_quantity(
    field: &'static str,
    value: Option<i32>,
) -> Result<u32, CostEstimateError> {
    let qty = value.unwrap_or_default();
    u32::try_from(qty).map_err(|_| CostEstimateError::InvalidInput {
        field,
        value: Decimal::from(qty),
    })
}

fn column_quantity(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
