//! Rate tables and policy knobs consumed by the pricing calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{EquipmentKind, EquipmentRate, LabourCategory, LabourRate, RateSchedule};

/// Fifty crew-weeks of eight-hour days.
const DEFAULT_MAX_HOURS_PER_CATEGORY: i64 = 2000;

/// Errors raised while assembling or validating a [`PricingConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingConfigError {
    #[error("no labour rate configured for {}", .0.as_str())]
    MissingLabourRate(LabourCategory),

    #[error("no daily rate configured for {}", .0.as_str())]
    MissingEquipmentRate(EquipmentKind),

    #[error("rates for {category} must be non-negative with tier_8h >= tier_2h, got {tier_2h} / {tier_8h}", category = .0.as_str(), tier_2h = .1.tier_2h, tier_8h = .1.tier_8h)]
    InvalidSchedule(LabourCategory, RateSchedule),

    #[error("daily rate for {kind} must be non-negative, got {rate}", kind = .0.as_str(), rate = .1)]
    InvalidEquipmentRate(EquipmentKind, Decimal),

    #[error("GST rate must be between 0 and 1, got {0}")]
    InvalidGstRate(Decimal),

    #[error("hours limit per category must be positive, got {0}")]
    InvalidHoursLimit(Decimal),

    #[error("unknown short job policy '{0}'")]
    UnknownShortJobPolicy(String),
}

/// How a block of two hours or less is charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortJobPolicy {
    /// The full 2-hour rate applies to any block of two hours or less.
    #[default]
    MinimumCharge,
    /// Linear from zero up to the 2-hour rate.
    Prorated,
}

impl ShortJobPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinimumCharge => "minimum-charge",
            Self::Prorated => "prorated",
        }
    }

    pub fn parse(s: &str) -> Result<Self, PricingConfigError> {
        match s {
            "minimum-charge" => Ok(Self::MinimumCharge),
            "prorated" => Ok(Self::Prorated),
            other => Err(PricingConfigError::UnknownShortJobPolicy(other.to_string())),
        }
    }
}

/// Everything the calculator needs to price a job.
///
/// [`PricingConfig::default`] carries the company's current published rates.
/// Backends store the same tables so they can be changed without a release;
/// use [`PricingConfig::from_rates`] to build a config from stored rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub non_demo: RateSchedule,
    pub demolition: RateSchedule,
    pub subfloor: RateSchedule,
    pub dehumidifier_daily: Decimal,
    pub air_mover_daily: Decimal,
    pub rcd_box_daily: Decimal,
    pub gst_rate: Decimal,
    pub short_job: ShortJobPolicy,
    /// Most hours a single labour category may be priced for.
    pub max_hours_per_category: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            non_demo: RateSchedule {
                tier_2h: Decimal::new(61200, 2),
                tier_8h: Decimal::new(121699, 2),
            },
            demolition: RateSchedule {
                tier_2h: Decimal::new(71190, 2),
                tier_8h: Decimal::new(179890, 2),
            },
            subfloor: RateSchedule {
                tier_2h: Decimal::new(90000, 2),
                tier_8h: Decimal::new(233469, 2),
            },
            dehumidifier_daily: Decimal::from(132),
            air_mover_daily: Decimal::from(46),
            rcd_box_daily: Decimal::from(5),
            gst_rate: Decimal::new(10, 2),
            short_job: ShortJobPolicy::MinimumCharge,
            max_hours_per_category: Decimal::from(DEFAULT_MAX_HOURS_PER_CATEGORY),
        }
    }
}

impl PricingConfig {
    /// Builds a config from stored rate rows, using the default GST rate.
    ///
    /// Every labour category and equipment kind must be present. Later rows
    /// for the same key win.
    pub fn from_rates(
        labour: &[LabourRate],
        equipment: &[EquipmentRate],
        short_job: ShortJobPolicy,
    ) -> Result<Self, PricingConfigError> {
        let schedule_for = |category: LabourCategory| {
            labour
                .iter()
                .rev()
                .find(|rate| rate.category == category)
                .map(LabourRate::schedule)
                .ok_or(PricingConfigError::MissingLabourRate(category))
        };
        let daily_for = |kind: EquipmentKind| {
            equipment
                .iter()
                .rev()
                .find(|rate| rate.kind == kind)
                .map(|rate| rate.daily_rate)
                .ok_or(PricingConfigError::MissingEquipmentRate(kind))
        };

        let config = Self {
            non_demo: schedule_for(LabourCategory::NonDemo)?,
            demolition: schedule_for(LabourCategory::Demolition)?,
            subfloor: schedule_for(LabourCategory::Subfloor)?,
            dehumidifier_daily: daily_for(EquipmentKind::Dehumidifier)?,
            air_mover_daily: daily_for(EquipmentKind::AirMover)?,
            rcd_box_daily: daily_for(EquipmentKind::RcdBox)?,
            short_job,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn schedule(&self, category: LabourCategory) -> RateSchedule {
        match category {
            LabourCategory::NonDemo => self.non_demo,
            LabourCategory::Demolition => self.demolition,
            LabourCategory::Subfloor => self.subfloor,
        }
    }

    pub fn daily_rate(&self, kind: EquipmentKind) -> Decimal {
        match kind {
            EquipmentKind::Dehumidifier => self.dehumidifier_daily,
            EquipmentKind::AirMover => self.air_mover_daily,
            EquipmentKind::RcdBox => self.rcd_box_daily,
        }
    }

    /// Checks that every rate is usable.
    ///
    /// A schedule whose 8-hour rate is below its 2-hour rate would make cost
    /// decrease as hours grow, so it is rejected.
    pub fn validate(&self) -> Result<(), PricingConfigError> {
        for category in LabourCategory::ALL {
            let schedule = self.schedule(category);
            if schedule.tier_2h < Decimal::ZERO || schedule.tier_8h < schedule.tier_2h {
                return Err(PricingConfigError::InvalidSchedule(category, schedule));
            }
        }

        for kind in EquipmentKind::ALL {
            let rate = self.daily_rate(kind);
            if rate < Decimal::ZERO {
                return Err(PricingConfigError::InvalidEquipmentRate(kind, rate));
            }
        }

        if self.gst_rate < Decimal::ZERO || self.gst_rate > Decimal::ONE {
            return Err(PricingConfigError::InvalidGstRate(self.gst_rate));
        }

        if self.max_hours_per_category <= Decimal::ZERO {
            return Err(PricingConfigError::InvalidHoursLimit(self.max_hours_per_category));
        }

        Ok(())
    }
}
