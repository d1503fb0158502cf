use std::io::Read;

use quote_core::{
    EquipmentKind, EquipmentRate, InspectionRepository, LabourCategory, LabourRate,
    PricingConfig, PricingConfigError, RepositoryError, ShortJobPolicy,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading rate data.
#[derive(Debug, Error)]
pub enum RateLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown rate kind '{0}' (expected 'labour' or 'equipment')")]
    UnknownKind(String),

    #[error("Unknown labour category '{0}'")]
    UnknownLabourCategory(String),

    #[error("Unknown equipment kind '{0}'")]
    UnknownEquipmentKind(String),

    #[error("Row '{code}' is missing a value for '{column}'")]
    MissingValue { code: String, column: &'static str },

    #[error("Rates would be unusable: {0}")]
    InvalidRates(#[from] PricingConfigError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for RateLoaderError {
    fn from(err: csv::Error) -> Self {
        RateLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a rates CSV file.
///
/// - `kind`: `labour` or `equipment`
/// - `code`: a labour category (`non_demo`, `demolition`, `subfloor`) or an
///   equipment kind (`dehumidifier`, `air_mover`, `rcd_box`)
/// - `tier_2h`, `tier_8h`: labour prices for a 2-hour job and a full day
/// - `daily_rate`: equipment hire per unit per day
///
/// Columns that do not apply to the row's kind are left empty.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RateRecord {
    pub kind: String,
    pub code: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub tier_2h: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub tier_8h: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub daily_rate: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn required(
    record: &RateRecord,
    value: Option<Decimal>,
    column: &'static str,
) -> Result<Decimal, RateLoaderError> {
    value.ok_or_else(|| RateLoaderError::MissingValue {
        code: record.code.clone(),
        column,
    })
}

/// Rows written by [`RateLoader::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub labour: usize,
    pub equipment: usize,
}

/// Loader for rate tables from CSV files.
///
/// Works through [`InspectionRepository`], so any backend can be loaded.
pub struct RateLoader;

impl RateLoader {
    /// Parse rate records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RateRecord>, RateLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: RateRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Convert parsed records into typed rates.
    pub fn to_rates(
        records: &[RateRecord]
    ) -> Result<(Vec<LabourRate>, Vec<EquipmentRate>), RateLoaderError> {
        let mut labour = Vec::new();
        let mut equipment = Vec::new();

        for record in records {
            let code = record.code.trim();
            match record.kind.trim() {
                "labour" => {
                    let category = LabourCategory::parse(code)
                        .ok_or_else(|| RateLoaderError::UnknownLabourCategory(code.to_string()))?;
                    labour.push(LabourRate {
                        category,
                        tier_2h: required(record, record.tier_2h, "tier_2h")?,
                        tier_8h: required(record, record.tier_8h, "tier_8h")?,
                    });
                }
                "equipment" => {
                    let kind = EquipmentKind::parse(code)
                        .ok_or_else(|| RateLoaderError::UnknownEquipmentKind(code.to_string()))?;
                    equipment.push(EquipmentRate {
                        kind,
                        daily_rate: required(record, record.daily_rate, "daily_rate")?,
                    });
                }
                other => return Err(RateLoaderError::UnknownKind(other.to_string())),
            }
        }

        Ok((labour, equipment))
    }

    /// Load rate records into the store.
    ///
    /// The file may update only some rates. Before anything is written, the
    /// stored rates overlaid with the file's rates must form a complete,
    /// valid rate set; otherwise nothing is written. Loading the same file
    /// twice gives the same result.
    pub async fn load<R: InspectionRepository + ?Sized>(
        repo: &R,
        records: &[RateRecord],
    ) -> Result<LoadSummary, RateLoaderError> {
        let (labour, equipment) = Self::to_rates(records)?;

        let mut all_labour = repo.list_labour_rates().await?;
        all_labour.extend(labour.iter().cloned());
        let mut all_equipment = repo.list_equipment_rates().await?;
        all_equipment.extend(equipment.iter().cloned());
        PricingConfig::from_rates(&all_labour, &all_equipment, ShortJobPolicy::default())?;

        for rate in &labour {
            repo.upsert_labour_rate(rate).await?;
        }
        for rate in &equipment {
            repo.upsert_equipment_rate(rate).await?;
        }

        info!(
            labour = labour.len(),
            equipment = equipment.len(),
            "rates loaded"
        );

        Ok(LoadSummary {
            labour: labour.len(),
            equipment: equipment.len(),
        })
    }
}
