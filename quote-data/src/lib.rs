//! Bulk loading of rate tables from CSV.

pub mod loader;

pub use loader::{LoadSummary, RateLoader, RateLoaderError, RateRecord};
