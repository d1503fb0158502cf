//! Session behaviour against an in-memory store.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use quote_core::calculations::{CostEstimateError, Subtotal};
use quote_core::session::{AreaUpdate, EstimateSession, LoadPhase, SessionError};
use quote_core::{
    AreaRecord, EquipmentQuantities, EquipmentRate, InspectionFields, InspectionRecord,
    InspectionRepository, LabourCategory, LabourRate, PricingConfig, RepositoryError,
};

// ─────────────────────────────────────────────────────────────────────────────
// in-memory repository
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Store {
    inspections: Vec<InspectionRecord>,
    areas: Vec<AreaRecord>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
struct MemoryRepository {
    store: Mutex<Store>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    fn check_write(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection("store offline".to_string()));
        }
        Ok(())
    }

    fn seed_inspection(
        &self,
        record: InspectionRecord,
    ) {
        let mut store = self.store.lock().unwrap();
        store.next_id = store.next_id.max(record.id);
        store.inspections.push(record);
    }

    fn seed_area(
        &self,
        area: AreaRecord,
    ) {
        let mut store = self.store.lock().unwrap();
        store.next_id = store.next_id.max(area.id.unwrap_or_default());
        store.areas.push(area);
    }

    fn inspections(&self) -> Vec<InspectionRecord> {
        self.store.lock().unwrap().inspections.clone()
    }

    fn areas(&self) -> Vec<AreaRecord> {
        let mut areas = self.store.lock().unwrap().areas.clone();
        areas.sort_by_key(|area| area.area_order);
        areas
    }
}

fn apply_fields(
    record: &mut InspectionRecord,
    fields: &InspectionFields,
) {
    record.no_demolition_hours = Some(fields.no_demolition_hours);
    record.demolition_hours = Some(fields.demolition_hours);
    record.subfloor_hours = Some(fields.subfloor_hours);
    record.subfloor_treatment_minutes = Some(fields.subfloor_treatment_minutes);
    record.dehumidifier_qty = Some(fields.dehumidifier_qty);
    record.air_mover_qty = Some(fields.air_mover_qty);
    record.rcd_box_qty = Some(fields.rcd_box_qty);
    record.equipment_cost_ex_gst = Some(fields.equipment_cost_ex_gst);
    record.labor_cost_ex_gst = Some(fields.labor_cost_ex_gst);
    record.discount_percent = Some(fields.discount_percent);
    record.subtotal_ex_gst = Some(fields.subtotal_ex_gst);
    record.gst_amount = Some(fields.gst_amount);
    record.total_inc_gst = Some(fields.total_inc_gst);
    record.manual_price_override = Some(fields.manual_price_override);
    record.manual_subtotal_ex_gst = fields.manual_subtotal_ex_gst;
    record.manual_total_inc_gst = fields.manual_total_inc_gst;
    record.updated_at = Utc::now();
}

#[async_trait]
impl InspectionRepository for MemoryRepository {
    async fn get_inspection_for_lead(
        &self,
        lead_id: i64,
    ) -> Result<Option<InspectionRecord>, RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection("store offline".to_string()));
        }
        let store = self.store.lock().unwrap();
        Ok(store.inspections.iter().find(|i| i.lead_id == lead_id).cloned())
    }

    async fn get_inspection(&self, id: i64) -> Result<InspectionRecord, RepositoryError> {
        let store = self.store.lock().unwrap();
        store
            .inspections
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_inspection(
        &self,
        lead_id: i64,
        fields: &InspectionFields,
    ) -> Result<InspectionRecord, RepositoryError> {
        self.check_write()?;
        let mut store = self.store.lock().unwrap();
        let mut record = inspection(store.next_id(), lead_id);
        apply_fields(&mut record, fields);
        store.inspections.push(record.clone());
        Ok(record)
    }

    async fn update_inspection(
        &self,
        id: i64,
        fields: &InspectionFields,
    ) -> Result<(), RepositoryError> {
        self.check_write()?;
        let mut store = self.store.lock().unwrap();
        let record = store
            .inspections
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepositoryError::NotFound)?;
        apply_fields(record, fields);
        Ok(())
    }

    async fn list_areas(&self, inspection_id: i64) -> Result<Vec<AreaRecord>, RepositoryError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .areas
            .iter()
            .filter(|a| a.inspection_id == inspection_id)
            .cloned()
            .collect())
    }

    async fn save_area(&self, area: &AreaRecord) -> Result<i64, RepositoryError> {
        self.check_write()?;
        let mut store = self.store.lock().unwrap();
        match area.id {
            Some(id) => {
                let existing = store
                    .areas
                    .iter_mut()
                    .find(|a| a.id == Some(id))
                    .ok_or(RepositoryError::NotFound)?;
                *existing = area.clone();
                Ok(id)
            }
            None => {
                let id = store.next_id();
                store.areas.push(AreaRecord {
                    id: Some(id),
                    ..area.clone()
                });
                Ok(id)
            }
        }
    }

    async fn delete_area(&self, id: i64) -> Result<(), RepositoryError> {
        self.check_write()?;
        let mut store = self.store.lock().unwrap();
        let before = store.areas.len();
        store.areas.retain(|a| a.id != Some(id));
        if store.areas.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_labour_rates(&self) -> Result<Vec<LabourRate>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn list_equipment_rates(&self) -> Result<Vec<EquipmentRate>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn upsert_labour_rate(&self, _rate: &LabourRate) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn upsert_equipment_rate(&self, _rate: &EquipmentRate) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// helpers
// ─────────────────────────────────────────────────────────────────────────────

const LEAD: i64 = 7;

fn inspection(
    id: i64,
    lead_id: i64,
) -> InspectionRecord {
    InspectionRecord {
        id,
        lead_id,
        no_demolition_hours: None,
        demolition_hours: None,
        subfloor_hours: None,
        subfloor_treatment_minutes: None,
        dehumidifier_qty: None,
        air_mover_qty: None,
        rcd_box_qty: None,
        equipment_cost_ex_gst: None,
        labor_cost_ex_gst: None,
        discount_percent: None,
        subtotal_ex_gst: None,
        gst_amount: None,
        total_inc_gst: None,
        manual_price_override: None,
        manual_subtotal_ex_gst: None,
        manual_total_inc_gst: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn area(
    id: i64,
    inspection_id: i64,
    order: i32,
    name: &str,
    job_minutes: i64,
) -> AreaRecord {
    AreaRecord {
        id: Some(id),
        inspection_id,
        area_order: order,
        area_name: name.to_string(),
        job_time_minutes: job_minutes,
        demolition_required: false,
        demolition_time_minutes: 0,
    }
}

/// An inspection priced at 3 non-demo hours with no equipment.
fn priced_inspection(id: i64) -> InspectionRecord {
    InspectionRecord {
        no_demolition_hours: Some(dec!(3)),
        equipment_cost_ex_gst: Some(dec!(0)),
        labor_cost_ex_gst: Some(dec!(712.83)),
        discount_percent: Some(dec!(0)),
        subtotal_ex_gst: Some(dec!(712.83)),
        gst_amount: Some(dec!(71.28)),
        total_inc_gst: Some(dec!(784.11)),
        ..inspection(id, LEAD)
    }
}

fn session(repository: &Arc<MemoryRepository>) -> EstimateSession {
    EstimateSession::new(repository.clone(), PricingConfig::default(), LEAD)
}

fn hours(hours: Decimal) -> AreaUpdate {
    AreaUpdate {
        name: Some("Bathroom".to_string()),
        time_without_demo: Some(hours),
        ..AreaUpdate::default()
    }
}

// =============================================================================
// load and the initial-load gate
// =============================================================================

#[tokio::test]
async fn load_for_new_lead_becomes_ready_with_empty_form() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);

    let outcome = session.load().await.unwrap();

    assert!(!outcome.existing);
    assert!(outcome.warnings.is_empty());
    assert_eq!(session.phase(), LoadPhase::Ready);
    assert_eq!(session.form().inspection_id(), None);
    assert_eq!(session.form().pricing().total_inc_gst, dec!(0));
}

#[tokio::test]
async fn area_edits_while_loading_leave_hours_alone() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);

    let key = session.add_area().unwrap();
    session.update_area(key, hours(dec!(4))).unwrap();

    assert_eq!(session.phase(), LoadPhase::Loading);
    assert_eq!(session.form().hours().non_demo, dec!(0));
    assert_eq!(session.form().pricing().subtotal, Subtotal::Calculated(dec!(0)));

    session.load().await.unwrap();
    session.update_area(key, hours(dec!(5))).unwrap();

    assert_eq!(session.form().hours().non_demo, dec!(5));
    assert_eq!(session.form().pricing().subtotal, Subtotal::Calculated(dec!(914.50)));
}

#[tokio::test]
async fn save_is_refused_while_loading() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);

    let result = session.save().await;

    assert_eq!(result, Err(SessionError::LoadInProgress));
    assert!(repository.inspections().is_empty());
}

#[tokio::test]
async fn load_failure_still_releases_the_gate() {
    let repository = Arc::new(MemoryRepository::default());
    repository.fail_reads.store(true, Ordering::SeqCst);
    let mut session = session(&repository);

    let result = session.load().await;

    assert!(matches!(result, Err(SessionError::Persistence(_))));
    assert!(result.unwrap_err().is_retryable());
    assert_eq!(session.phase(), LoadPhase::Ready);
}

#[tokio::test]
async fn failed_load_can_be_retried() {
    let repository = Arc::new(MemoryRepository::default());
    repository.fail_reads.store(true, Ordering::SeqCst);
    let mut session = session(&repository);
    session.load().await.unwrap_err();

    repository.fail_reads.store(false, Ordering::SeqCst);
    repository.seed_inspection(priced_inspection(1));
    let outcome = session.load().await.unwrap();

    assert!(outcome.existing);
    assert_eq!(session.form().inspection_id(), Some(1));
}

#[tokio::test]
async fn second_load_is_refused_and_keeps_edits() {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed_inspection(priced_inspection(1));
    let mut session = session(&repository);
    session.load().await.unwrap();
    session.set_labour_hours(LabourCategory::NonDemo, dec!(8)).unwrap();

    let result = session.load().await;

    assert_eq!(result, Err(SessionError::AlreadyLoaded));
    assert_eq!(session.form().hours().non_demo, dec!(8));
    assert!(session.form().is_dirty());
}

#[tokio::test]
async fn areas_entered_while_loading_are_priced_for_new_lead() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    let key = session.add_area().unwrap();
    session.update_area(key, hours(dec!(4))).unwrap();

    let outcome = session.load().await.unwrap();

    assert!(!outcome.existing);
    assert!(outcome.reconciled);
    assert_eq!(session.form().hours().non_demo, dec!(4));
    assert_eq!(session.form().pricing().subtotal, Subtotal::Calculated(dec!(813.66)));
}

#[tokio::test]
async fn negative_stored_quantity_fails_the_load() {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed_inspection(InspectionRecord {
        air_mover_qty: Some(-2),
        ..priced_inspection(1)
    });
    let mut session = session(&repository);

    let result = session.load().await;

    assert_eq!(
        result,
        Err(SessionError::InvalidInput(CostEstimateError::InvalidInput {
            field: "air_mover_qty",
            value: dec!(-2),
        }))
    );
    assert_eq!(session.form().inspection_id(), None);
}

#[tokio::test]
async fn load_trusts_priced_figures_even_when_areas_disagree() {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed_inspection(InspectionRecord {
        subtotal_ex_gst: Some(dec!(999.00)),
        ..priced_inspection(1)
    });
    repository.seed_area(area(2, 1, 0, "Bathroom", 600));
    let mut session = session(&repository);

    let outcome = session.load().await.unwrap();

    assert!(outcome.existing);
    assert!(!outcome.reconciled);
    assert_eq!(session.form().hours().non_demo, dec!(3));
    assert_eq!(session.form().pricing().subtotal, Subtotal::Calculated(dec!(999.00)));
    assert!(!session.form().is_dirty());
}

#[tokio::test]
async fn load_recomputes_stale_equipment_cost() {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed_inspection(InspectionRecord {
        dehumidifier_qty: Some(2),
        ..priced_inspection(1)
    });
    let mut session = session(&repository);

    let outcome = session.load().await.unwrap();

    assert!(outcome.reconciled);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].stored_equipment_cost, dec!(0));
    assert_eq!(outcome.warnings[0].quantities.dehumidifiers, 2);
    assert_eq!(session.form().pricing().equipment_cost_ex_gst, dec!(264.00));
    assert_eq!(session.form().pricing().subtotal, Subtotal::Calculated(dec!(976.83)));
    assert_eq!(session.form().pricing().gst_amount, dec!(97.68));
    assert_eq!(session.form().pricing().total_inc_gst, dec!(1074.51));
}

#[tokio::test]
async fn load_prices_inspection_with_no_cost_fields() {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed_inspection(InspectionRecord {
        no_demolition_hours: Some(dec!(3)),
        ..inspection(1, LEAD)
    });
    let mut session = session(&repository);

    let outcome = session.load().await.unwrap();

    assert!(outcome.existing);
    assert!(outcome.reconciled);
    assert!(outcome.warnings.is_empty());
    assert_eq!(session.form().pricing().subtotal, Subtotal::Calculated(dec!(712.83)));
}

#[tokio::test]
async fn recalculate_replaces_trusted_figures_on_request() {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed_inspection(InspectionRecord {
        subtotal_ex_gst: Some(dec!(999.00)),
        ..priced_inspection(1)
    });
    let mut session = session(&repository);
    session.load().await.unwrap();

    assert!(session.recalculate().unwrap());
    assert!(!session.recalculate().unwrap());
    assert_eq!(session.form().pricing().subtotal, Subtotal::Calculated(dec!(712.83)));
    assert!(session.form().is_dirty());
}

// =============================================================================
// derived hours
// =============================================================================

#[tokio::test]
async fn demolition_flag_gates_demolition_hours() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();

    let key = session.add_area().unwrap();
    session
        .update_area(
            key,
            AreaUpdate {
                demolition_time: Some(dec!(5)),
                ..AreaUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(session.form().hours().demolition, dec!(0));

    session
        .update_area(
            key,
            AreaUpdate {
                demolition_required: Some(true),
                ..AreaUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(session.form().hours().demolition, dec!(5));
}

#[tokio::test]
async fn negative_area_time_is_rejected_without_change() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();
    let key = session.add_area().unwrap();
    session.update_area(key, hours(dec!(2))).unwrap();

    let result = session.update_area(key, hours(dec!(-1)));

    assert!(matches!(result, Err(SessionError::InvalidInput(_))));
    assert_eq!(session.form().hours().non_demo, dec!(2));
}

#[tokio::test]
async fn hours_over_the_limit_are_rejected_without_change() {
    let repository = Arc::new(MemoryRepository::default());
    let config = PricingConfig {
        max_hours_per_category: dec!(10),
        ..PricingConfig::default()
    };
    let mut session = EstimateSession::new(repository.clone(), config, LEAD);
    session.load().await.unwrap();
    let first = session.add_area().unwrap();
    let second = session.add_area().unwrap();
    session.update_area(first, hours(dec!(6))).unwrap();
    let before = session.form().clone();

    let result = session.update_area(second, hours(dec!(5)));

    assert_eq!(
        result,
        Err(SessionError::InvalidInput(CostEstimateError::HoursOverLimit {
            field: "non_demo_hours",
            value: dec!(11),
            max: dec!(10),
        }))
    );
    assert_eq!(session.form(), &before);

    session.update_area(second, hours(dec!(4))).unwrap();
    assert_eq!(session.form().hours().non_demo, dec!(10));

    let result = session.set_labour_hours(LabourCategory::Subfloor, dec!(10.5));
    assert!(matches!(
        result,
        Err(SessionError::InvalidInput(CostEstimateError::HoursOverLimit { .. }))
    ));
    assert_eq!(session.form().hours().subfloor, dec!(0));
}

#[tokio::test]
async fn labour_hours_can_be_set_directly_once_ready() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();

    session.set_labour_hours(LabourCategory::Subfloor, dec!(2)).unwrap();

    assert_eq!(session.form().hours().subfloor, dec!(2));
    assert_eq!(session.form().pricing().subtotal, Subtotal::Calculated(dec!(900.00)));
}

// =============================================================================
// manual override
// =============================================================================

#[tokio::test]
async fn manual_subtotal_survives_equipment_changes() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();
    session.set_labour_hours(LabourCategory::NonDemo, dec!(3)).unwrap();

    session.set_manual_subtotal(Some(dec!(1000))).unwrap();
    session
        .set_equipment_quantities(EquipmentQuantities {
            dehumidifiers: 3,
            ..EquipmentQuantities::default()
        })
        .unwrap();

    let pricing = session.form().pricing();
    assert_eq!(pricing.subtotal, Subtotal::Manual(dec!(1000)));
    assert_eq!(pricing.gst_amount, dec!(100.00));
    assert_eq!(pricing.total_inc_gst, dec!(1100.00));
    assert_eq!(pricing.equipment_cost_ex_gst, dec!(396.00));

    session.save().await.unwrap();
    let stored = &repository.inspections()[0];
    assert_eq!(stored.manual_price_override, Some(true));
    assert_eq!(stored.manual_subtotal_ex_gst, Some(dec!(1000)));
    assert_eq!(stored.manual_total_inc_gst, Some(dec!(1100.00)));
    assert_eq!(stored.subtotal_ex_gst, Some(dec!(1000)));
    assert_eq!(stored.total_inc_gst, Some(dec!(1100.00)));
}

#[tokio::test]
async fn clearing_manual_subtotal_returns_to_calculated() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();
    session.set_labour_hours(LabourCategory::NonDemo, dec!(3)).unwrap();
    session.set_manual_subtotal(Some(dec!(1000))).unwrap();

    session.set_manual_subtotal(None).unwrap();

    assert!(!session.form().is_manual_override());
    assert_eq!(session.form().pricing().subtotal, Subtotal::Calculated(dec!(712.83)));
}

#[tokio::test]
async fn legacy_manual_total_loads_as_ex_gst_subtotal() {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed_inspection(InspectionRecord {
        manual_price_override: Some(true),
        manual_total_inc_gst: Some(dec!(1650)),
        ..priced_inspection(1)
    });
    let mut session = session(&repository);

    session.load().await.unwrap();
    session.set_equipment_quantities(EquipmentQuantities::default()).unwrap();

    let pricing = session.form().pricing();
    assert_eq!(pricing.subtotal, Subtotal::Manual(dec!(1500.00)));
    assert_eq!(pricing.total_inc_gst, dec!(1650.00));
}

// =============================================================================
// save
// =============================================================================

#[tokio::test]
async fn save_creates_then_updates_the_inspection() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();
    let key = session.add_area().unwrap();
    session.update_area(key, hours(dec!(3))).unwrap();

    let first = session.save().await.unwrap();
    session.update_area(key, hours(dec!(10))).unwrap();
    let second = session.save().await.unwrap();

    assert_eq!(first.inspection_id, second.inspection_id);
    assert_eq!(repository.inspections().len(), 1);
    assert_eq!(repository.areas().len(), 1);
    assert_eq!(repository.areas()[0].job_time_minutes, 600);
    assert_eq!(repository.inspections()[0].discount_percent, Some(dec!(0.075)));
    assert!(!session.form().is_dirty());
}

#[tokio::test]
async fn failed_save_keeps_form_and_can_be_retried() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();
    let key = session.add_area().unwrap();
    session.update_area(key, hours(dec!(3))).unwrap();
    let before = session.form().clone();
    repository.fail_writes.store(true, Ordering::SeqCst);

    let err = session.save().await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(session.form(), &before);
    assert!(session.form().is_dirty());

    repository.fail_writes.store(false, Ordering::SeqCst);
    let outcome = session.save().await.unwrap();

    assert_eq!(outcome.areas_saved, 1);
    assert_eq!(repository.inspections().len(), 1);
    assert_eq!(repository.inspections()[0].subtotal_ex_gst, Some(dec!(712.83)));
}

#[tokio::test]
async fn save_deletes_removed_areas_and_renumbers() {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed_inspection(priced_inspection(1));
    repository.seed_area(area(2, 1, 0, "Bathroom", 120));
    repository.seed_area(area(3, 1, 1, "Laundry", 60));
    let mut session = session(&repository);
    session.load().await.unwrap();
    let bathroom = session.form().areas()[0].key;

    session.remove_area(bathroom).unwrap();
    let outcome = session.save().await.unwrap();

    assert_eq!(outcome.areas_deleted, 1);
    let areas = repository.areas();
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].id, Some(3));
    assert_eq!(areas[0].area_order, 0);
    assert!(session.form().removed_area_ids().is_empty());
}

#[tokio::test]
async fn save_ignores_areas_already_deleted_elsewhere() {
    let repository = Arc::new(MemoryRepository::default());
    repository.seed_inspection(priced_inspection(1));
    repository.seed_area(area(2, 1, 0, "Bathroom", 120));
    let mut session = session(&repository);
    session.load().await.unwrap();
    let key = session.form().areas()[0].key;
    session.remove_area(key).unwrap();
    repository.store.lock().unwrap().areas.clear();

    let outcome = session.save().await.unwrap();

    assert_eq!(outcome.areas_deleted, 0);
}

#[tokio::test]
async fn save_names_unnamed_areas_by_position() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();
    session.add_area().unwrap();
    session.add_area().unwrap();

    session.save().await.unwrap();

    let names: Vec<String> = repository.areas().into_iter().map(|a| a.area_name).collect();
    assert_eq!(names, vec!["Area 1".to_string(), "Area 2".to_string()]);
}

#[tokio::test]
async fn detached_save_completes_in_background() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();
    session.set_labour_hours(LabourCategory::NonDemo, dec!(8)).unwrap();

    session.save_detached().await.unwrap();

    let stored = repository.inspections();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].subtotal_ex_gst, Some(dec!(1216.99)));
}

// =============================================================================
// completion
// =============================================================================

#[tokio::test]
async fn completion_requires_named_area_and_hours() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();

    let problems = session.validate_completion().unwrap_err();
    assert_eq!(problems.len(), 2);

    let key = session.add_area().unwrap();
    session.update_area(key, hours(dec!(1))).unwrap();
    assert_eq!(session.validate_completion(), Ok(()));
}

#[tokio::test]
async fn completion_accepts_manual_price_without_hours() {
    let repository = Arc::new(MemoryRepository::default());
    let mut session = session(&repository);
    session.load().await.unwrap();
    let key = session.add_area().unwrap();
    session.update_area(key, hours(dec!(0))).unwrap();

    session.set_manual_subtotal(Some(dec!(450))).unwrap();

    assert_eq!(session.validate_completion(), Ok(()));
}
