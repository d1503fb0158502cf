//! [`EstimateSession`] ties the form, its load lifecycle and the store
//! together.
//!
//! Event flow:
//! 1. `load` fetches the stored inspection, copies it into the form
//!    verbatim, flips the phase to `Ready` and runs one reconciliation.
//! 2. Edit events update a copy of the form, re-derive hours and prices
//!    through the phase-gated functions in [`recompute`](super::recompute),
//!    and keep the copy only if it still prices.
//! 3. `save` prices the form from scratch and writes it out. A failed save
//!    leaves the form as it was so the user can retry.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::form::{AreaUpdate, EstimateForm, check_non_negative, manual_subtotal};
use super::lifecycle::LoadPhase;
use super::recompute::{
    FormPricing, Reconciliation, StaleDataWarning, price_form, reconciliation_for, reprice,
    sync_hours,
};
use crate::calculations::Subtotal;
use crate::db::{InspectionRepository, RepositoryError};
use crate::{
    AreaKey, AreaRecord, EquipmentQuantities, InspectionRecord, LabourCategory, PricingConfig,
};

/// Result of [`EstimateSession::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    /// An inspection was already stored for the lead.
    pub existing: bool,
    /// The one-time reconciliation recomputed the loaded figures.
    pub reconciled: bool,
    pub warnings: Vec<StaleDataWarning>,
}

/// Result of a successful [`EstimateSession::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub inspection_id: i64,
    pub areas_saved: usize,
    pub areas_deleted: usize,
}

pub struct EstimateSession {
    repository: Arc<dyn InspectionRepository>,
    config: PricingConfig,
    lead_id: i64,
    phase: LoadPhase,
    /// Set once a load has succeeded.
    loaded: bool,
    form: EstimateForm,
}

impl EstimateSession {
    /// A session for `lead_id`, still `Loading` until [`load`](Self::load)
    /// completes.
    pub fn new(
        repository: Arc<dyn InspectionRepository>,
        config: PricingConfig,
        lead_id: i64,
    ) -> Self {
        Self {
            repository,
            config,
            lead_id,
            phase: LoadPhase::Loading,
            loaded: false,
            form: EstimateForm::default(),
        }
    }

    pub fn lead_id(&self) -> i64 {
        self.lead_id
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn form(&self) -> &EstimateForm {
        &self.form
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Full pricing of the current form, for display. Never writes.
    pub fn preview(&self) -> Result<FormPricing, SessionError> {
        Ok(price_form(&self.form, &self.config)?)
    }

    /// Loads the lead's stored inspection into the form.
    ///
    /// The phase becomes `Ready` whether or not the fetch succeeded. On
    /// failure the form stays empty and the error is returned; the call may
    /// then be retried. Once a load has succeeded, later calls fail with
    /// [`SessionError::AlreadyLoaded`].
    pub async fn load(&mut self) -> Result<LoadOutcome, SessionError> {
        if self.loaded {
            return Err(SessionError::AlreadyLoaded);
        }

        let fetched = self.fetch().await;
        self.phase.mark_ready();

        let (record, areas) = match fetched {
            Ok(Some((record, areas))) => (Some(record), areas),
            Ok(None) => (None, Vec::new()),
            Err(err) => {
                warn!(lead_id = self.lead_id, error = %err, "failed to load inspection");
                return Err(err.into());
            }
        };

        if let Some(record) = &record {
            self.form = EstimateForm::from_stored(record, &areas, self.config.gst_rate)
                .inspect_err(|err| {
                    warn!(inspection_id = record.id, error = %err, "stored inspection is invalid");
                })?;
        }

        info!(
            lead_id = self.lead_id,
            inspection_id = ?self.form.inspection_id(),
            areas = self.form.areas().len(),
            "inspection loaded"
        );

        let decision = reconciliation_for(record.as_ref());
        let mut warnings = Vec::new();

        if let (Reconciliation::StaleEquipmentCost, Some(record)) = (decision, &record) {
            let warning = StaleDataWarning {
                inspection_id: record.id,
                quantities: self.form.equipment(),
                stored_equipment_cost: record.equipment_cost_ex_gst.unwrap_or_default(),
            };
            warn!(
                inspection_id = record.id,
                stored_equipment_cost = %warning.stored_equipment_cost,
                "equipment booked but stored cost is zero; recomputing"
            );
            warnings.push(warning);
        }

        let reconciled = if decision.needs_recompute() {
            // Areas entered while loading have no stored hours to protect.
            let derived = record.is_none() && sync_hours(self.phase, &mut self.form);
            reprice(self.phase, &mut self.form, &self.config)? || derived
        } else {
            debug!(lead_id = self.lead_id, "trusting stored figures");
            false
        };

        self.loaded = true;
        Ok(LoadOutcome {
            existing: record.is_some(),
            reconciled,
            warnings,
        })
    }

    async fn fetch(&self) -> Result<Option<(InspectionRecord, Vec<AreaRecord>)>, RepositoryError> {
        let Some(record) = self.repository.get_inspection_for_lead(self.lead_id).await? else {
            return Ok(None);
        };
        let areas = self.repository.list_areas(record.id).await?;
        Ok(Some((record, areas)))
    }

    // ─────────────────────────────────────────────────────────────────────
    // edit events
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_area(&mut self) -> Result<AreaKey, SessionError> {
        let mut key = AreaKey(0);
        self.edit(Rederive::HoursAndPrices, |form| key = form.push_area())?;
        Ok(key)
    }

    pub fn update_area(
        &mut self,
        key: AreaKey,
        update: AreaUpdate,
    ) -> Result<(), SessionError> {
        update.validate()?;
        if self.form.area(key).is_none() {
            return Err(SessionError::UnknownArea(key));
        }
        self.edit(Rederive::HoursAndPrices, |form| {
            form.update_area(key, update);
        })
    }

    /// Removes an area. Stored areas are deleted from the store on the next
    /// save.
    pub fn remove_area(
        &mut self,
        key: AreaKey,
    ) -> Result<(), SessionError> {
        if self.form.area(key).is_none() {
            return Err(SessionError::UnknownArea(key));
        }
        self.edit(Rederive::HoursAndPrices, |form| {
            form.remove_area(key);
        })
    }

    pub fn set_subfloor_treatment_hours(
        &mut self,
        hours: Decimal,
    ) -> Result<(), SessionError> {
        check_non_negative("subfloor_treatment_hours", Some(hours))?;
        self.edit(Rederive::HoursAndPrices, |form| form.subfloor_treatment_hours = hours)
    }

    /// Overrides one category's hours until the next area change re-derives
    /// them. Ignored while loading.
    pub fn set_labour_hours(
        &mut self,
        category: LabourCategory,
        hours: Decimal,
    ) -> Result<(), SessionError> {
        check_non_negative(hours_field(category), Some(hours))?;
        if !self.phase.is_ready() {
            debug!(category = category.as_str(), "ignoring hours edit while loading");
            return Ok(());
        }
        self.edit(Rederive::Prices, |form| form.hours.set(category, hours))
    }

    pub fn set_equipment_quantities(
        &mut self,
        quantities: EquipmentQuantities,
    ) -> Result<(), SessionError> {
        self.edit(Rederive::Prices, |form| form.equipment = quantities)
    }

    /// Turns the manual override on with `Some(subtotal)` (ex GST), or off
    /// with `None`. Ignored while loading.
    pub fn set_manual_subtotal(
        &mut self,
        subtotal: Option<Decimal>,
    ) -> Result<(), SessionError> {
        check_non_negative("manual_subtotal_ex_gst", subtotal)?;
        if !self.phase.is_ready() {
            debug!("ignoring manual override edit while loading");
            return Ok(());
        }
        self.edit(Rederive::Prices, |form| {
            form.pricing.subtotal = match subtotal {
                Some(value) => manual_subtotal(value),
                None => Subtotal::Calculated(form.pricing.subtotal.amount()),
            };
        })
    }

    /// Re-prices the held hours and equipment with the session's rates.
    ///
    /// Returns `true` and marks the form dirty when a figure changed. A
    /// manual subtotal is kept. Does nothing while loading.
    pub fn recalculate(&mut self) -> Result<bool, SessionError> {
        let changed = reprice(self.phase, &mut self.form, &self.config)?;
        if changed {
            self.form.dirty = true;
        }
        Ok(changed)
    }

    /// Applies `change` to a copy of the form and re-derives it. The form
    /// is replaced only when the copy prices; otherwise it is left as it was
    /// and the error is returned.
    fn edit(
        &mut self,
        rederive: Rederive,
        change: impl FnOnce(&mut EstimateForm),
    ) -> Result<(), SessionError> {
        let mut draft = self.form.clone();
        change(&mut draft);
        if rederive == Rederive::HoursAndPrices {
            sync_hours(self.phase, &mut draft);
        }
        reprice(self.phase, &mut draft, &self.config)?;
        draft.dirty = true;
        self.form = draft;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // save
    // ─────────────────────────────────────────────────────────────────────

    /// Prices the form from scratch and writes it to the store.
    ///
    /// Order: inspection row, then deletion of removed areas, then the
    /// remaining areas in list order. Store ids are recorded as they come
    /// back so a retry after a partial failure updates rather than
    /// duplicates. Priced figures and the dirty flag only change once
    /// everything has been written.
    ///
    /// # Errors
    /// * [`SessionError::LoadInProgress`] before `load` has finished.
    /// * [`SessionError::InvalidInput`] if the form holds negative values.
    /// * [`SessionError::Persistence`] if the store rejects any write.
    pub async fn save(&mut self) -> Result<SaveOutcome, SessionError> {
        if !self.phase.is_ready() {
            return Err(SessionError::LoadInProgress);
        }

        let pricing = price_form(&self.form, &self.config)?;
        let fields = self.form.to_fields(&pricing.fields);

        let inspection_id = match self.form.inspection_id {
            Some(id) => {
                self.repository.update_inspection(id, &fields).await?;
                id
            }
            None => {
                let created = self.repository.create_inspection(self.lead_id, &fields).await?;
                self.form.inspection_id = Some(created.id);
                created.id
            }
        };

        let mut areas_deleted = 0;
        while let Some(&area_id) = self.form.removed_area_ids.first() {
            match self.repository.delete_area(area_id).await {
                Ok(()) => areas_deleted += 1,
                Err(RepositoryError::NotFound) => {
                    debug!(area_id, "removed area was already gone");
                }
                Err(err) => return Err(err.into()),
            }
            self.form.removed_area_ids.remove(0);
        }

        for index in 0..self.form.areas.len() {
            let order = i32::try_from(index).unwrap_or(i32::MAX);
            let record = self.form.areas[index].to_record(inspection_id, order);
            let area_id = self.repository.save_area(&record).await?;
            self.form.areas[index].id = Some(area_id);
        }

        self.form.pricing = pricing.fields;
        self.form.dirty = false;

        info!(
            lead_id = self.lead_id,
            inspection_id,
            subtotal = %pricing.fields.subtotal.amount(),
            total = %pricing.fields.total_inc_gst,
            manual = pricing.fields.subtotal.is_manual(),
            "inspection saved"
        );

        Ok(SaveOutcome {
            inspection_id,
            areas_saved: self.form.areas.len(),
            areas_deleted,
        })
    }

    /// Hands a final save to a background task and gives up the session.
    ///
    /// Used on teardown: the save runs to completion even though nobody
    /// awaits it. A failure is logged.
    pub fn save_detached(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(err) = self.save().await {
                warn!(lead_id = self.lead_id, error = %err, "background save failed");
            }
        })
    }

    /// Checks the form is complete enough to submit.
    ///
    /// Returns every problem found, not just the first.
    pub fn validate_completion(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if !self
            .form
            .areas()
            .iter()
            .any(|area| !area.name.trim().is_empty())
        {
            problems.push("at least one named area is required".to_string());
        }

        if !self.form.is_manual_override() && self.form.hours().total() <= Decimal::ZERO {
            problems.push("labour hours are required unless the price is set manually".to_string());
        }

        if problems.is_empty() { Ok(()) } else { Err(problems) }
    }
}

/// What an edit re-derives before it is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rederive {
    /// Labour hours from the areas, then prices.
    HoursAndPrices,
    Prices,
}

fn hours_field(category: LabourCategory) -> &'static str {
    match category {
        LabourCategory::NonDemo => "non_demo_hours",
        LabourCategory::Demolition => "demolition_hours",
        LabourCategory::Subfloor => "subfloor_hours",
    }
}
