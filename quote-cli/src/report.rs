//! Plain-text rendering of a priced estimate.

use std::fmt;

use quote_core::LabourCategory;
use quote_core::calculations::LabourHours;
use quote_core::calculations::common::round_half_up;
use quote_core::session::FormPricing;
use rust_decimal::Decimal;

/// A priced estimate ready to print.
pub struct EstimateReport<'a> {
    pub hours: LabourHours,
    pub pricing: &'a FormPricing,
}

impl<'a> EstimateReport<'a> {
    pub fn new(
        hours: LabourHours,
        pricing: &'a FormPricing,
    ) -> Self {
        Self { hours, pricing }
    }
}

fn percent(fraction: Decimal) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED).normalize()
}

impl fmt::Display for EstimateReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let estimate = &self.pricing.estimate;
        let equipment = &self.pricing.equipment;
        let fields = &self.pricing.fields;

        writeln!(f, "Labour")?;
        for category in LabourCategory::ALL {
            let hours = self.hours.get(category);
            if hours <= Decimal::ZERO {
                continue;
            }
            writeln!(
                f,
                "  {:<22} {:>6}h {:>10.2}",
                category.label(),
                hours.normalize(),
                round_half_up(estimate.cost(category))
            )?;
            for line in estimate.breakdown(category) {
                writeln!(f, "      {}", line.description)?;
            }
        }
        writeln!(
            f,
            "Labour subtotal:          {:>10.2}",
            round_half_up(estimate.labour_subtotal)
        )?;
        writeln!(
            f,
            "{:<26}-{:>9.2}  {}",
            format!("Discount ({}%):", percent(estimate.discount_percent)),
            round_half_up(estimate.discount_amount),
            estimate.discount_tier_description
        )?;
        writeln!(f, "Labour after discount:    {:>10.2}", fields.labour_cost_ex_gst)?;

        if equipment.total > Decimal::ZERO {
            writeln!(f, "Equipment ({} day(s))", equipment.days)?;
            for line in equipment.lines.iter().filter(|line| line.quantity > 0) {
                writeln!(
                    f,
                    "  {:<14} x{:<3} @ {:>7.2} {:>10.2}",
                    line.kind.label(),
                    line.quantity,
                    round_half_up(line.daily_rate),
                    round_half_up(line.cost)
                )?;
            }
        }
        writeln!(f, "Equipment:                {:>10.2}", fields.equipment_cost_ex_gst)?;

        let marker = if fields.subtotal.is_manual() {
            "  (manual)"
        } else {
            ""
        };
        writeln!(
            f,
            "Subtotal ex GST:          {:>10.2}{marker}",
            fields.subtotal.amount()
        )?;
        writeln!(f, "GST:                      {:>10.2}", fields.gst_amount)?;
        write!(f, "Total inc GST:            {:>10.2}", fields.total_inc_gst)
    }
}
