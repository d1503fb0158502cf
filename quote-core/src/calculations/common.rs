//! Common utility functions for estimate calculations.
//!
//! This module provides shared functionality used across the pricing
//! calculations, including rounding and day-block counting.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Length of one billable day block, in hours.
pub const DAY_BLOCK_HOURS: i64 = 8;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use quote_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Number of day blocks needed to cover `hours`: `ceil(hours / 8)`.
///
/// Zero or negative hours need no days.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use quote_core::calculations::common::day_count;
///
/// assert_eq!(day_count(dec!(0)), 0);
/// assert_eq!(day_count(dec!(8)), 1);
/// assert_eq!(day_count(dec!(8.5)), 2);
/// ```
pub fn day_count(hours: Decimal) -> u32 {
    if hours <= Decimal::ZERO {
        return 0;
    }

    (hours / Decimal::from(DAY_BLOCK_HOURS))
        .ceil()
        .to_u32()
        .unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_repeating_fraction() {
        // 612 + 604.99 / 6
        let result = round_half_up(dec!(612) + dec!(604.99) / dec!(6));

        assert_eq!(result, dec!(712.83));
    }

    #[test]
    fn round_half_up_handles_zero() {
        let result = round_half_up(dec!(0.00));

        assert_eq!(result, dec!(0.00));
    }

    // =========================================================================
    // day_count tests
    // =========================================================================

    #[test]
    fn day_count_is_zero_without_hours() {
        assert_eq!(day_count(dec!(0)), 0);
        assert_eq!(day_count(dec!(-1)), 0);
    }

    #[test]
    fn day_count_rounds_partial_days_up() {
        assert_eq!(day_count(dec!(0.5)), 1);
        assert_eq!(day_count(dec!(8)), 1);
        assert_eq!(day_count(dec!(8.01)), 2);
        assert_eq!(day_count(dec!(16)), 2);
        assert_eq!(day_count(dec!(25)), 4);
    }
}
