//! The estimate form session: in-memory form state, the load/ready
//! lifecycle that gates recomputation, and the save path.

pub mod error;
pub mod form;
pub mod guard;
pub mod lifecycle;
pub mod recompute;

pub use error::SessionError;
pub use form::{AreaUpdate, EstimateForm, PricedFields};
pub use guard::{EstimateSession, LoadOutcome, SaveOutcome};
pub use lifecycle::LoadPhase;
pub use recompute::{
    FormPricing, Reconciliation, StaleDataWarning, price_form, reconciliation_for, reprice,
    sync_hours,
};
