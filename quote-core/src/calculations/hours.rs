//! Labour hours per category, and their derivation from inspected areas.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{InspectionArea, LabourCategory};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabourHours {
    pub non_demo: Decimal,
    pub demolition: Decimal,
    pub subfloor: Decimal,
}

impl LabourHours {
    pub fn get(
        &self,
        category: LabourCategory,
    ) -> Decimal {
        match category {
            LabourCategory::NonDemo => self.non_demo,
            LabourCategory::Demolition => self.demolition,
            LabourCategory::Subfloor => self.subfloor,
        }
    }

    pub fn set(
        &mut self,
        category: LabourCategory,
        hours: Decimal,
    ) {
        match category {
            LabourCategory::NonDemo => self.non_demo = hours,
            LabourCategory::Demolition => self.demolition = hours,
            LabourCategory::Subfloor => self.subfloor = hours,
        }
    }

    pub fn total(&self) -> Decimal {
        self.non_demo + self.demolition + self.subfloor
    }
}

/// Sums area time into category hours.
///
/// Every area contributes its time without demolition. Demolition time only
/// counts for areas flagged as requiring demolition; a leftover demolition
/// time on an unflagged area contributes nothing. Subfloor hours come from
/// the separate subfloor treatment time.
pub fn aggregate_hours(
    areas: &[InspectionArea],
    subfloor_treatment_hours: Decimal,
) -> LabourHours {
    LabourHours {
        non_demo: areas.iter().map(|area| area.time_without_demo).sum(),
        demolition: areas
            .iter()
            .filter(|area| area.demolition_required)
            .map(|area| area.demolition_time)
            .sum(),
        subfloor: subfloor_treatment_hours,
    }
}
