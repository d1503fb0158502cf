//! Subtotal authority and the GST/total figures derived from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;

/// The subtotal (ex GST) that GST and the grand total are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subtotal {
    /// Produced by the tier pricing calculator.
    Calculated(Decimal),
    /// Entered by the user; recalculation never replaces it.
    Manual(Decimal),
}

impl Subtotal {
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Calculated(value) | Self::Manual(value) => *value,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual(_))
    }
}

impl Default for Subtotal {
    fn default() -> Self {
        Self::Calculated(Decimal::ZERO)
    }
}

/// Rounded money figures as stored and displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal_ex_gst: Decimal,
    pub gst_amount: Decimal,
    pub total_inc_gst: Decimal,
}

impl Totals {
    /// Derives GST and the grand total from whichever subtotal is authoritative.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use quote_core::calculations::{Subtotal, Totals};
    ///
    /// let totals = Totals::from_subtotal(Subtotal::Manual(dec!(1000)), dec!(0.10));
    ///
    /// assert_eq!(totals.gst_amount, dec!(100.00));
    /// assert_eq!(totals.total_inc_gst, dec!(1100.00));
    /// ```
    pub fn from_subtotal(
        subtotal: Subtotal,
        gst_rate: Decimal,
    ) -> Self {
        let subtotal_ex_gst = round_half_up(subtotal.amount());
        let gst_amount = round_half_up(subtotal_ex_gst * gst_rate);

        Self {
            subtotal_ex_gst,
            gst_amount,
            total_inc_gst: subtotal_ex_gst + gst_amount,
        }
    }
}

/// Recovers an ex-GST subtotal from a GST-inclusive total.
///
/// Older records only stored the manual total including GST.
pub fn ex_gst_from_inc_gst(
    total_inc_gst: Decimal,
    gst_rate: Decimal,
) -> Decimal {
    round_half_up(total_inc_gst / (Decimal::ONE + gst_rate))
}
