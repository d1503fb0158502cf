use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

const MINUTES_PER_HOUR: i64 = 60;

/// Identifies an area inside one form session, whether or not it has been
/// persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaKey(pub u64);

/// An inspected area as held by the form.
///
/// Only the fields that feed the labour estimate are modelled; photos,
/// moisture readings and free-text notes live with the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionArea {
    pub key: AreaKey,
    /// Store id, `None` until the area has been saved once.
    pub id: Option<i64>,
    pub name: String,
    pub time_without_demo: Decimal,
    pub demolition_required: bool,
    pub demolition_time: Decimal,
}

impl InspectionArea {
    pub fn new(key: AreaKey) -> Self {
        Self {
            key,
            id: None,
            name: String::new(),
            time_without_demo: Decimal::ZERO,
            demolition_required: false,
            demolition_time: Decimal::ZERO,
        }
    }

    pub fn from_record(
        key: AreaKey,
        record: &AreaRecord,
    ) -> Self {
        Self {
            key,
            id: record.id,
            name: record.area_name.clone(),
            time_without_demo: minutes_to_hours(record.job_time_minutes),
            demolition_required: record.demolition_required,
            demolition_time: minutes_to_hours(record.demolition_time_minutes),
        }
    }

    /// Builds the row to persist. Unnamed areas are stored as `Area {n}`.
    pub fn to_record(
        &self,
        inspection_id: i64,
        area_order: i32,
    ) -> AreaRecord {
        let area_name = if self.name.trim().is_empty() {
            format!("Area {}", area_order + 1)
        } else {
            self.name.clone()
        };

        AreaRecord {
            id: self.id,
            inspection_id,
            area_order,
            area_name,
            job_time_minutes: hours_to_minutes(self.time_without_demo),
            demolition_required: self.demolition_required,
            demolition_time_minutes: hours_to_minutes(self.demolition_time),
        }
    }
}

/// A stored inspection area. Time is kept in whole minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRecord {
    /// `None` when the row has not been inserted yet.
    pub id: Option<i64>,
    pub inspection_id: i64,
    pub area_order: i32,
    pub area_name: String,
    pub job_time_minutes: i64,
    pub demolition_required: bool,
    pub demolition_time_minutes: i64,
}

pub(crate) fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::from(minutes) / Decimal::from(MINUTES_PER_HOUR)
}

/// Hours beyond the `i64` minute range saturate.
pub(crate) fn hours_to_minutes(hours: Decimal) -> i64 {
    hours
        .checked_mul(Decimal::from(MINUTES_PER_HOUR))
        .map(|minutes| minutes.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minutes| minutes.to_i64())
        .unwrap_or(if hours.is_sign_negative() { i64::MIN } else { i64::MAX })
}
