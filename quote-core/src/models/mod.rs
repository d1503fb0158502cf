pub(crate) mod area;
mod equipment;
mod inspection;
mod labour;
mod pricing_config;

pub use area::{AreaKey, AreaRecord, InspectionArea};
pub use equipment::{EquipmentKind, EquipmentQuantities, EquipmentRate};
pub use inspection::{InspectionFields, InspectionRecord};
pub use labour::{LabourCategory, LabourRate, RateSchedule};
pub use pricing_config::{PricingConfig, PricingConfigError, ShortJobPolicy};
