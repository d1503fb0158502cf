//! Equipment hire: quantity × daily rate × job days.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::day_count;
use crate::{EquipmentKind, EquipmentQuantities, PricingConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentLine {
    pub kind: EquipmentKind,
    pub quantity: u32,
    pub daily_rate: Decimal,
    pub cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentCost {
    /// Hire days, at least one.
    pub days: u32,
    pub lines: Vec<EquipmentLine>,
    pub total: Decimal,
}

/// Prices the booked equipment for a job of `total_labour_hours`.
///
/// Equipment stays on site for `ceil(total_labour_hours / 8)` days, and is
/// always charged for at least one day.
pub fn equipment_cost(
    quantities: &EquipmentQuantities,
    config: &PricingConfig,
    total_labour_hours: Decimal,
) -> EquipmentCost {
    let days = day_count(total_labour_hours).max(1);

    let lines: Vec<EquipmentLine> = EquipmentKind::ALL
        .iter()
        .map(|&kind| {
            let quantity = quantities.quantity(kind);
            let daily_rate = config.daily_rate(kind);
            EquipmentLine {
                kind,
                quantity,
                daily_rate,
                cost: Decimal::from(quantity) * daily_rate * Decimal::from(days),
            }
        })
        .collect();

    let total = lines.iter().map(|line| line.cost).sum();

    EquipmentCost { days, lines, total }
}
