pub mod calculations;
pub mod db;
pub mod models;
pub mod session;

pub use db::repository::{InspectionRepository, RepositoryError};
pub use models::*;
