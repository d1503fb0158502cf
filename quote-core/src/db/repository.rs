use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AreaRecord, EquipmentRate, InspectionFields, InspectionRecord, LabourRate,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for inspections, their areas and the rate tables.
///
/// Every call may fail; the estimate session treats any error as retryable
/// and keeps its in-memory state untouched.
#[async_trait]
pub trait InspectionRepository: Send + Sync {
    // Inspections
    async fn get_inspection_for_lead(
        &self,
        lead_id: i64,
    ) -> Result<Option<InspectionRecord>, RepositoryError>;

    async fn get_inspection(&self, id: i64) -> Result<InspectionRecord, RepositoryError>;

    async fn create_inspection(
        &self,
        lead_id: i64,
        fields: &InspectionFields,
    ) -> Result<InspectionRecord, RepositoryError>;

    async fn update_inspection(
        &self,
        id: i64,
        fields: &InspectionFields,
    ) -> Result<(), RepositoryError>;

    // Areas
    async fn list_areas(&self, inspection_id: i64) -> Result<Vec<AreaRecord>, RepositoryError>;

    /// Inserts the area when `id` is `None`, otherwise updates it.
    /// Returns the stored id.
    async fn save_area(&self, area: &AreaRecord) -> Result<i64, RepositoryError>;

    async fn delete_area(&self, id: i64) -> Result<(), RepositoryError>;

    // Rates
    async fn list_labour_rates(&self) -> Result<Vec<LabourRate>, RepositoryError>;
    async fn list_equipment_rates(&self) -> Result<Vec<EquipmentRate>, RepositoryError>;
    async fn upsert_labour_rate(&self, rate: &LabourRate) -> Result<(), RepositoryError>;
    async fn upsert_equipment_rate(&self, rate: &EquipmentRate) -> Result<(), RepositoryError>;
}
