//! Multi-day volume discount applied to the labour subtotal.
//!
//! | Total labour hours | Discount |
//! |--------------------|----------|
//! | up to 8            | 0%       |
//! | over 8, up to 16   | 7.5%     |
//! | over 16, up to 24  | 10.25%   |
//! | over 24            | 13% (cap)|
//!
//! The discount is a step function of the total: it never changes within a
//! band and never exceeds 13%.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discount band selected for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDiscount {
    /// Fraction of the labour subtotal, e.g. `0.075` for 7.5%.
    pub percent: Decimal,
    pub description: &'static str,
}

impl VolumeDiscount {
    /// The largest discount any job can receive.
    pub fn maximum() -> Decimal {
        Decimal::new(13, 2)
    }

    /// Selects the band for the total labour hours across all categories.
    pub fn for_hours(total_hours: Decimal) -> Self {
        let (percent, description) = if total_hours <= Decimal::ZERO {
            (Decimal::ZERO, "No work")
        } else if total_hours <= Decimal::from(8) {
            (Decimal::ZERO, "No discount (1 day or less)")
        } else if total_hours <= Decimal::from(16) {
            (Decimal::new(75, 3), "7.5% multi-day discount (2 days)")
        } else if total_hours <= Decimal::from(24) {
            (Decimal::new(1025, 4), "10.25% multi-day discount (3 days)")
        } else {
            (Self::maximum(), "13% maximum discount (4+ days)")
        };

        Self {
            percent,
            description,
        }
    }
}
