//! Operations behind the `quote` subcommands.

use std::sync::Arc;

use anyhow::{Context, Result};
use quote_core::calculations::LabourHours;
use quote_core::db::{DbConfig, RepositoryRegistry};
use quote_core::session::{
    EstimateForm, EstimateSession, FormPricing, LoadOutcome, SaveOutcome, price_form,
};
use quote_core::{EquipmentQuantities, InspectionRepository, PricingConfig, ShortJobPolicy};
use quote_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

pub fn build_registry() -> RepositoryRegistry {
    RepositoryRegistry::new().with(SqliteRepositoryFactory)
}

pub async fn open_repository(config: &DbConfig) -> Result<Arc<dyn InspectionRepository>> {
    build_registry().open(config).await.with_context(|| {
        format!("cannot open {} store '{}'", config.backend, config.connection_string)
    })
}

/// Builds the pricing config from the rates held by the store.
///
/// `max_hours_per_category` replaces the built-in limit when given.
pub async fn load_pricing_config(
    repository: &dyn InspectionRepository,
    short_job: ShortJobPolicy,
    max_hours_per_category: Option<Decimal>,
) -> Result<PricingConfig> {
    let labour = repository
        .list_labour_rates()
        .await
        .context("cannot read labour rates")?;
    let equipment = repository
        .list_equipment_rates()
        .await
        .context("cannot read equipment rates")?;

    let mut config = PricingConfig::from_rates(&labour, &equipment, short_job)
        .context("stored rate tables are incomplete or invalid")?;
    if let Some(max) = max_hours_per_category {
        config.max_hours_per_category = max;
        config.validate().context("invalid pricing settings")?;
    }
    debug!(
        short_job = config.short_job.as_str(),
        max_hours = %config.max_hours_per_category,
        "pricing config loaded"
    );
    Ok(config)
}

/// Prices hours and equipment directly, without a stored inspection.
pub fn quote_hours(
    config: &PricingConfig,
    hours: LabourHours,
    equipment: EquipmentQuantities,
    manual_subtotal: Option<Decimal>,
) -> Result<FormPricing> {
    let form = EstimateForm::quick_quote(hours, equipment, manual_subtotal)?;
    Ok(price_form(&form, config)?)
}

/// Opens and loads the session for a lead.
pub async fn open_session(
    repository: Arc<dyn InspectionRepository>,
    config: PricingConfig,
    lead_id: i64,
) -> Result<(EstimateSession, LoadOutcome)> {
    let mut session = EstimateSession::new(repository, config, lead_id);
    let outcome = session
        .load()
        .await
        .with_context(|| format!("cannot load inspection for lead {lead_id}"))?;

    for warning in &outcome.warnings {
        warn!(
            inspection_id = warning.inspection_id,
            "stored equipment cost was zero with equipment booked"
        );
    }
    Ok((session, outcome))
}

/// Re-prices a loaded inspection with the current rates and saves it when
/// any figure changed, unless `dry_run` is set.
///
/// Returns the save outcome, or `None` when nothing was written.
pub async fn reprice_inspection(
    session: &mut EstimateSession,
    outcome: &LoadOutcome,
    dry_run: bool,
) -> Result<Option<SaveOutcome>> {
    if !outcome.existing {
        anyhow::bail!("no inspection stored for lead {}", session.lead_id());
    }

    let changed = session.recalculate()? || outcome.reconciled;
    if !changed {
        info!(lead_id = session.lead_id(), "stored figures already current");
        return Ok(None);
    }
    if dry_run {
        info!(lead_id = session.lead_id(), "dry run, figures not saved");
        return Ok(None);
    }

    let saved = session
        .save()
        .await
        .with_context(|| format!("cannot save inspection for lead {}", session.lead_id()))?;
    Ok(Some(saved))
}
