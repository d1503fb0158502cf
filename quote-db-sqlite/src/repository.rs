use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use quote_core::{
    AreaRecord, EquipmentKind, EquipmentRate, InspectionFields, InspectionRecord,
    InspectionRepository, LabourCategory, LabourRate, RepositoryError,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal, get_optional_decimal};

const INSPECTION_COLUMNS: &str = "id, lead_id, no_demolition_hours, demolition_hours,
    subfloor_hours, subfloor_treatment_minutes, dehumidifier_qty, air_mover_qty, rcd_box_qty,
    equipment_cost_ex_gst, labor_cost_ex_gst, discount_percent, subtotal_ex_gst, gst_amount,
    total_inc_gst, manual_price_override, manual_subtotal_ex_gst, manual_total_inc_gst,
    created_at, updated_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens `database_url`, which may be a bare path (`quotes.db`), a sqlx
    /// URL (`sqlite:quotes.db`) or `:memory:`. Database files are created
    /// when missing.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Each in-memory connection is its own database, so keep exactly one
        // alive for the life of the pool.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "seed file applied");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn get<'r, T>(
    row: &'r SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", column, e)))
}

fn row_to_inspection(row: &SqliteRow) -> Result<InspectionRecord, RepositoryError> {
    Ok(InspectionRecord {
        id: get(row, "id")?,
        lead_id: get(row, "lead_id")?,
        no_demolition_hours: get_optional_decimal(row, "no_demolition_hours")?,
        demolition_hours: get_optional_decimal(row, "demolition_hours")?,
        subfloor_hours: get_optional_decimal(row, "subfloor_hours")?,
        subfloor_treatment_minutes: get(row, "subfloor_treatment_minutes")?,
        dehumidifier_qty: get(row, "dehumidifier_qty")?,
        air_mover_qty: get(row, "air_mover_qty")?,
        rcd_box_qty: get(row, "rcd_box_qty")?,
        equipment_cost_ex_gst: get_optional_decimal(row, "equipment_cost_ex_gst")?,
        labor_cost_ex_gst: get_optional_decimal(row, "labor_cost_ex_gst")?,
        discount_percent: get_optional_decimal(row, "discount_percent")?,
        subtotal_ex_gst: get_optional_decimal(row, "subtotal_ex_gst")?,
        gst_amount: get_optional_decimal(row, "gst_amount")?,
        total_inc_gst: get_optional_decimal(row, "total_inc_gst")?,
        manual_price_override: get(row, "manual_price_override")?,
        manual_subtotal_ex_gst: get_optional_decimal(row, "manual_subtotal_ex_gst")?,
        manual_total_inc_gst: get_optional_decimal(row, "manual_total_inc_gst")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn row_to_area(row: &SqliteRow) -> Result<AreaRecord, RepositoryError> {
    Ok(AreaRecord {
        id: Some(get(row, "id")?),
        inspection_id: get(row, "inspection_id")?,
        area_order: get(row, "area_order")?,
        area_name: get(row, "area_name")?,
        job_time_minutes: get(row, "job_time_minutes")?,
        demolition_required: get(row, "demolition_required")?,
        demolition_time_minutes: get(row, "demolition_time_minutes")?,
    })
}

#[async_trait]
impl InspectionRepository for SqliteRepository {
    async fn get_inspection_for_lead(
        &self,
        lead_id: i64,
    ) -> Result<Option<InspectionRecord>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {INSPECTION_COLUMNS} FROM inspections WHERE lead_id = ?"
        ))
        .bind(lead_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(row_to_inspection).transpose()
    }

    async fn get_inspection(
        &self,
        id: i64,
    ) -> Result<InspectionRecord, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {INSPECTION_COLUMNS} FROM inspections WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_inspection(&row)
    }

    async fn create_inspection(
        &self,
        lead_id: i64,
        fields: &InspectionFields,
    ) -> Result<InspectionRecord, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO inspections (
                lead_id, no_demolition_hours, demolition_hours, subfloor_hours,
                subfloor_treatment_minutes, dehumidifier_qty, air_mover_qty, rcd_box_qty,
                equipment_cost_ex_gst, labor_cost_ex_gst, discount_percent, subtotal_ex_gst,
                gst_amount, total_inc_gst, manual_price_override, manual_subtotal_ex_gst,
                manual_total_inc_gst, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(lead_id)
        .bind(decimal_to_text(fields.no_demolition_hours))
        .bind(decimal_to_text(fields.demolition_hours))
        .bind(decimal_to_text(fields.subfloor_hours))
        .bind(fields.subfloor_treatment_minutes)
        .bind(fields.dehumidifier_qty)
        .bind(fields.air_mover_qty)
        .bind(fields.rcd_box_qty)
        .bind(decimal_to_text(fields.equipment_cost_ex_gst))
        .bind(decimal_to_text(fields.labor_cost_ex_gst))
        .bind(decimal_to_text(fields.discount_percent))
        .bind(decimal_to_text(fields.subtotal_ex_gst))
        .bind(decimal_to_text(fields.gst_amount))
        .bind(decimal_to_text(fields.total_inc_gst))
        .bind(fields.manual_price_override)
        .bind(fields.manual_subtotal_ex_gst.map(decimal_to_text))
        .bind(fields.manual_total_inc_gst.map(decimal_to_text))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.get_inspection(result.last_insert_rowid()).await
    }

    async fn update_inspection(
        &self,
        id: i64,
        fields: &InspectionFields,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE inspections SET
                no_demolition_hours = ?, demolition_hours = ?, subfloor_hours = ?,
                subfloor_treatment_minutes = ?, dehumidifier_qty = ?, air_mover_qty = ?,
                rcd_box_qty = ?, equipment_cost_ex_gst = ?, labor_cost_ex_gst = ?,
                discount_percent = ?, subtotal_ex_gst = ?, gst_amount = ?, total_inc_gst = ?,
                manual_price_override = ?, manual_subtotal_ex_gst = ?, manual_total_inc_gst = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(decimal_to_text(fields.no_demolition_hours))
        .bind(decimal_to_text(fields.demolition_hours))
        .bind(decimal_to_text(fields.subfloor_hours))
        .bind(fields.subfloor_treatment_minutes)
        .bind(fields.dehumidifier_qty)
        .bind(fields.air_mover_qty)
        .bind(fields.rcd_box_qty)
        .bind(decimal_to_text(fields.equipment_cost_ex_gst))
        .bind(decimal_to_text(fields.labor_cost_ex_gst))
        .bind(decimal_to_text(fields.discount_percent))
        .bind(decimal_to_text(fields.subtotal_ex_gst))
        .bind(decimal_to_text(fields.gst_amount))
        .bind(decimal_to_text(fields.total_inc_gst))
        .bind(fields.manual_price_override)
        .bind(fields.manual_subtotal_ex_gst.map(decimal_to_text))
        .bind(fields.manual_total_inc_gst.map(decimal_to_text))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_areas(
        &self,
        inspection_id: i64,
    ) -> Result<Vec<AreaRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, inspection_id, area_order, area_name, job_time_minutes,
                    demolition_required, demolition_time_minutes
             FROM inspection_areas
             WHERE inspection_id = ?
             ORDER BY area_order, id",
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_area).collect()
    }

    async fn save_area(
        &self,
        area: &AreaRecord,
    ) -> Result<i64, RepositoryError> {
        match area.id {
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE inspection_areas SET
                        inspection_id = ?, area_order = ?, area_name = ?, job_time_minutes = ?,
                        demolition_required = ?, demolition_time_minutes = ?
                     WHERE id = ?",
                )
                .bind(area.inspection_id)
                .bind(area.area_order)
                .bind(&area.area_name)
                .bind(area.job_time_minutes)
                .bind(area.demolition_required)
                .bind(area.demolition_time_minutes)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;

                if result.rows_affected() == 0 {
                    return Err(RepositoryError::NotFound);
                }
                Ok(id)
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO inspection_areas (
                        inspection_id, area_order, area_name, job_time_minutes,
                        demolition_required, demolition_time_minutes
                    ) VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(area.inspection_id)
                .bind(area.area_order)
                .bind(&area.area_name)
                .bind(area.job_time_minutes)
                .bind(area.demolition_required)
                .bind(area.demolition_time_minutes)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;

                Ok(result.last_insert_rowid())
            }
        }
    }

    async fn delete_area(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM inspection_areas WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_labour_rates(&self) -> Result<Vec<LabourRate>, RepositoryError> {
        let rows = sqlx::query("SELECT category, tier_2h, tier_8h FROM labour_rates ORDER BY category")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                let code: String = get(row, "category")?;
                let category = LabourCategory::parse(&code).ok_or_else(|| {
                    RepositoryError::Database(format!("Invalid labour category: {}", code))
                })?;
                Ok(LabourRate {
                    category,
                    tier_2h: get_decimal(row, "tier_2h")?,
                    tier_8h: get_decimal(row, "tier_8h")?,
                })
            })
            .collect()
    }

    async fn list_equipment_rates(&self) -> Result<Vec<EquipmentRate>, RepositoryError> {
        let rows = sqlx::query("SELECT kind, daily_rate FROM equipment_rates ORDER BY kind")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                let code: String = get(row, "kind")?;
                let kind = EquipmentKind::parse(&code).ok_or_else(|| {
                    RepositoryError::Database(format!("Invalid equipment kind: {}", code))
                })?;
                Ok(EquipmentRate {
                    kind,
                    daily_rate: get_decimal(row, "daily_rate")?,
                })
            })
            .collect()
    }

    async fn upsert_labour_rate(
        &self,
        rate: &LabourRate,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO labour_rates (category, tier_2h, tier_8h) VALUES (?, ?, ?)
             ON CONFLICT (category) DO UPDATE SET
                tier_2h = excluded.tier_2h,
                tier_8h = excluded.tier_8h",
        )
        .bind(rate.category.as_str())
        .bind(decimal_to_text(rate.tier_2h))
        .bind(decimal_to_text(rate.tier_8h))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn upsert_equipment_rate(
        &self,
        rate: &EquipmentRate,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO equipment_rates (kind, daily_rate) VALUES (?, ?)
             ON CONFLICT (kind) DO UPDATE SET daily_rate = excluded.daily_rate",
        )
        .bind(rate.kind.as_str())
        .bind(decimal_to_text(rate.daily_rate))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
