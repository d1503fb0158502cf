use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hire equipment billed per unit per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Dehumidifier,
    AirMover,
    RcdBox,
}

impl EquipmentKind {
    pub const ALL: [EquipmentKind; 3] = [Self::Dehumidifier, Self::AirMover, Self::RcdBox];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dehumidifier => "dehumidifier",
            Self::AirMover => "air_mover",
            Self::RcdBox => "rcd_box",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dehumidifier" => Some(Self::Dehumidifier),
            "air_mover" => Some(Self::AirMover),
            "rcd_box" => Some(Self::RcdBox),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dehumidifier => "Commercial dehumidifier",
            Self::AirMover => "Air mover",
            Self::RcdBox => "RCD box",
        }
    }
}

/// A stored equipment rate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRate {
    pub kind: EquipmentKind,
    pub daily_rate: Decimal,
}

/// Units of each equipment kind booked on a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentQuantities {
    pub dehumidifiers: u32,
    pub air_movers: u32,
    pub rcd_boxes: u32,
}

impl EquipmentQuantities {
    pub fn quantity(&self, kind: EquipmentKind) -> u32 {
        match kind {
            EquipmentKind::Dehumidifier => self.dehumidifiers,
            EquipmentKind::AirMover => self.air_movers,
            EquipmentKind::RcdBox => self.rcd_boxes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dehumidifiers == 0 && self.air_movers == 0 && self.rcd_boxes == 0
    }
}
