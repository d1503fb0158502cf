use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Job-type categories that labour hours are priced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabourCategory {
    NonDemo,
    Demolition,
    Subfloor,
}

impl LabourCategory {
    pub const ALL: [LabourCategory; 3] = [Self::NonDemo, Self::Demolition, Self::Subfloor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonDemo => "non_demo",
            Self::Demolition => "demolition",
            Self::Subfloor => "subfloor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "non_demo" => Some(Self::NonDemo),
            "demolition" => Some(Self::Demolition),
            "subfloor" => Some(Self::Subfloor),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NonDemo => "Non-demolition",
            Self::Demolition => "Demolition",
            Self::Subfloor => "Subfloor",
        }
    }
}

/// Two-point rate schedule: the price of a 2-hour job and of a full 8-hour day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSchedule {
    pub tier_2h: Decimal,
    pub tier_8h: Decimal,
}

/// A stored labour rate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabourRate {
    pub category: LabourCategory,
    pub tier_2h: Decimal,
    pub tier_8h: Decimal,
}

impl LabourRate {
    pub fn schedule(&self) -> RateSchedule {
        RateSchedule {
            tier_2h: self.tier_2h,
            tier_8h: self.tier_8h,
        }
    }
}
