use fournil_core::db::open_db_in_memory;
use fournil_core::{
    NewProduct, Product, ProductCatalog, ProductRepository, Quantities, QuantityError,
    QuantityField, RepoError, RepoResult, SaleDate, SaleObservation, SalesEntryError,
    SalesEntrySession, SalesStore, SessionPhase, SqliteProductRepository, SqliteSalesRepository,
    WriteStatus,
};
use rusqlite::Connection;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

fn day() -> SaleDate {
    SaleDate::parse("2024-06-01").unwrap()
}

fn seed_bakery(conn: &Connection) -> (i64, i64) {
    let repo = SqliteProductRepository::try_new(conn).unwrap();
    let baguette = repo.create_product(&NewProduct::new("Baguette")).unwrap();
    let croissant = repo.create_product(&NewProduct::new("Croissant")).unwrap();
    (baguette.id, croissant.id)
}

/// In-memory store that can fail reads or writes for chosen products.
#[derive(Default)]
struct FlakyStore {
    rows: RefCell<BTreeMap<(i64, SaleDate), Quantities>>,
    upserts: RefCell<Vec<i64>>,
    failing_products: Vec<i64>,
    fail_reads: Cell<bool>,
}

impl SalesStore for FlakyStore {
    fn read_for_date(&self, date: SaleDate) -> RepoResult<Vec<SaleObservation>> {
        if self.fail_reads.get() {
            return Err(RepoError::InvalidData("store offline".to_string()));
        }
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|((_, row_date), _)| *row_date == date)
            .map(|((product_id, row_date), quantities)| SaleObservation {
                product_id: *product_id,
                date: *row_date,
                quantities: *quantities,
            })
            .collect())
    }

    fn upsert(&self, observation: &SaleObservation) -> RepoResult<()> {
        self.upserts.borrow_mut().push(observation.product_id);
        if self.failing_products.contains(&observation.product_id) {
            return Err(RepoError::InvalidData("write rejected".to_string()));
        }
        self.rows.borrow_mut().insert(
            (observation.product_id, observation.date),
            observation.quantities,
        );
        Ok(())
    }
}

struct FixedCatalog(Vec<Product>);

impl ProductCatalog for FixedCatalog {
    fn list_active(&self) -> RepoResult<Vec<Product>> {
        Ok(self.0.clone())
    }
}

struct BrokenCatalog;

impl ProductCatalog for BrokenCatalog {
    fn list_active(&self) -> RepoResult<Vec<Product>> {
        Err(RepoError::InvalidData("catalog offline".to_string()))
    }
}

fn catalog(size: i64) -> FixedCatalog {
    FixedCatalog(
        (1..=size)
            .map(|id| Product::new(id, format!("product {id}")))
            .collect(),
    )
}

#[test]
fn fresh_day_reconciles_to_zeroed_working_set() {
    let conn = open_db_in_memory().unwrap();
    let (baguette, croissant) = seed_bakery(&conn);
    let mut session = SalesEntrySession::new(
        SqliteProductRepository::try_new(&conn).unwrap(),
        SqliteSalesRepository::try_new(&conn).unwrap(),
    );
    assert_eq!(session.phase(), SessionPhase::Unloaded);

    let result = session.select_date(day()).unwrap();
    assert!(!result.has_prior_data());
    assert_eq!(result.len(), 2);
    assert_eq!(
        result.get(baguette).unwrap().quantities,
        Quantities::new(0, 0)
    );
    assert_eq!(
        result.get(croissant).unwrap().quantities,
        Quantities::new(0, 0)
    );
    assert_eq!(session.phase(), SessionPhase::Editable);
}

#[test]
fn commit_writes_only_edited_products() {
    let conn = open_db_in_memory().unwrap();
    let (baguette, croissant) = seed_bakery(&conn);
    let mut session = SalesEntrySession::new(
        SqliteProductRepository::try_new(&conn).unwrap(),
        SqliteSalesRepository::try_new(&conn).unwrap(),
    );
    session.select_date(day()).unwrap();

    session.set_sold(baguette, 40).unwrap();
    session.set_unsold(baguette, 5).unwrap();
    let report = session.commit().unwrap();

    assert_eq!(report.written_count(), 1);
    assert!(!report.overwritten());
    assert_eq!(session.phase(), SessionPhase::Committed);

    let store = SqliteSalesRepository::try_new(&conn).unwrap();
    let rows = store.read_for_date(day()).unwrap();
    assert_eq!(rows, vec![SaleObservation::new(baguette, day(), 40, 5)]);
    assert!(rows.iter().all(|row| row.product_id != croissant));
}

#[test]
fn previously_recorded_day_is_seeded_and_replaced_on_commit() {
    let conn = open_db_in_memory().unwrap();
    let (baguette, _) = seed_bakery(&conn);
    SqliteSalesRepository::try_new(&conn)
        .unwrap()
        .upsert(&SaleObservation::new(baguette, day(), 30, 2))
        .unwrap();

    let mut session = SalesEntrySession::new(
        SqliteProductRepository::try_new(&conn).unwrap(),
        SqliteSalesRepository::try_new(&conn).unwrap(),
    );
    let result = session.select_date(day()).unwrap();
    assert!(result.has_prior_data());
    assert_eq!(
        result.get(baguette).unwrap().quantities,
        Quantities::new(30, 2)
    );

    session.set_sold(baguette, 35).unwrap();
    let report = session.commit().unwrap();
    assert!(report.overwritten());

    let rows = SqliteSalesRepository::try_new(&conn)
        .unwrap()
        .read_for_date(day())
        .unwrap();
    assert_eq!(rows, vec![SaleObservation::new(baguette, day(), 35, 2)]);
}

#[test]
fn prior_data_flag_survives_edits_back_to_zero() {
    let store = FlakyStore::default();
    store.upsert(&SaleObservation::new(1, day(), 3, 1)).unwrap();
    let mut session = SalesEntrySession::new(catalog(2), &store);
    session.select_date(day()).unwrap();

    session.set_sold(1, 0).unwrap();
    session.set_unsold(1, 0).unwrap();
    let report = session.commit().unwrap();

    assert!(session.reconciliation().unwrap().has_prior_data());
    assert!(report.overwritten());
    assert_eq!(report.attempted_count(), 0);
}

#[test]
fn committing_same_buffer_twice_leaves_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let (baguette, croissant) = seed_bakery(&conn);
    let mut session = SalesEntrySession::new(
        SqliteProductRepository::try_new(&conn).unwrap(),
        SqliteSalesRepository::try_new(&conn).unwrap(),
    );
    session.select_date(day()).unwrap();
    session.set_sold(baguette, 12).unwrap();
    session.set_unsold(croissant, 3).unwrap();

    session.commit().unwrap();
    let store = SqliteSalesRepository::try_new(&conn).unwrap();
    let once = store.read_for_date(day()).unwrap();
    let second = session.commit().unwrap();
    let twice = store.read_for_date(day()).unwrap();

    assert_eq!(once, twice);
    assert_eq!(second.written_count(), 2);
}

#[test]
fn single_failure_reports_partial_commit() {
    let store = FlakyStore {
        failing_products: vec![3],
        ..FlakyStore::default()
    };
    let mut session = SalesEntrySession::new(catalog(4), &store);
    session.select_date(day()).unwrap();
    for id in 1..=4 {
        session.set_sold(id, 10 + id).unwrap();
    }

    let report = session.commit().unwrap();

    assert_eq!(report.attempted_count(), 4);
    assert_eq!(report.written_count(), 3);
    assert_eq!(report.failed_ids(), vec![3]);
    assert_eq!(session.phase(), SessionPhase::PartiallyCommitted);
    assert_eq!(*store.upserts.borrow(), vec![1, 2, 3, 4]);
    assert!(matches!(
        report.outcomes()[2].status,
        WriteStatus::Failed { .. }
    ));

    let persisted: Vec<_> = store
        .read_for_date(day())
        .unwrap()
        .iter()
        .map(|row| row.product_id)
        .collect();
    assert_eq!(persisted, vec![1, 2, 4]);
}

#[test]
fn edit_after_commit_returns_to_editable() {
    let store = FlakyStore::default();
    let mut session = SalesEntrySession::new(catalog(1), &store);
    session.select_date(day()).unwrap();
    session.set_sold(1, 4).unwrap();
    session.commit().unwrap();
    assert_eq!(session.phase(), SessionPhase::Committed);

    session.set_input(1, QuantityField::Unsold, "2").unwrap();
    assert_eq!(session.phase(), SessionPhase::Editable);
    assert!(session.last_report().is_some());
}

#[test]
fn changing_date_discards_unsaved_edits() {
    let store = FlakyStore::default();
    let mut session = SalesEntrySession::new(catalog(2), &store);
    session.select_date(day()).unwrap();
    session.set_sold(1, 9).unwrap();

    let next_day = day().days_after(1).unwrap();
    session.select_date(next_day).unwrap();
    session.select_date(day()).unwrap();

    assert_eq!(
        session.buffer().unwrap().get(1),
        Some(Quantities::default())
    );
    assert!(store.upserts.borrow().is_empty());
}

#[test]
fn invalid_quantity_is_rejected_without_touching_buffer() {
    let store = FlakyStore::default();
    let mut session = SalesEntrySession::new(catalog(1), &store);
    session.select_date(day()).unwrap();

    let err = session.set_sold(1, -4).unwrap_err();
    assert!(matches!(
        err,
        SalesEntryError::Edit(fournil_core::EditError::InvalidQuantity(
            QuantityError::Negative(_)
        ))
    ));
    assert_eq!(
        session.buffer().unwrap().get(1),
        Some(Quantities::default())
    );
}

#[test]
fn store_read_failure_is_surfaced_and_leaves_session_unloaded() {
    let store = FlakyStore::default();
    let mut session = SalesEntrySession::new(catalog(2), &store);
    session.select_date(day()).unwrap();
    store.fail_reads.set(true);

    let err = session.select_date(day()).unwrap_err();
    assert!(matches!(err, SalesEntryError::StoreRead { date, .. } if date == day()));
    assert_eq!(session.phase(), SessionPhase::Unloaded);
    assert!(matches!(
        session.commit().unwrap_err(),
        SalesEntryError::NoDateSelected
    ));
}

#[test]
fn catalog_failure_aborts_reconciliation() {
    let store = FlakyStore::default();
    let mut session = SalesEntrySession::new(BrokenCatalog, &store);

    let err = session.select_date(day()).unwrap_err();
    assert!(matches!(err, SalesEntryError::CatalogRead(_)));
    assert_eq!(session.phase(), SessionPhase::Unloaded);
}

#[test]
fn empty_catalog_yields_empty_editable_working_set() {
    let store = FlakyStore::default();
    let mut session = SalesEntrySession::new(FixedCatalog(Vec::new()), &store);

    let result = session.select_date(day()).unwrap();
    assert!(result.is_empty());
    let report = session.commit().unwrap();
    assert_eq!(report.summary(), "nothing to save for 2024-06-01");
}

#[test]
fn deactivated_product_leaves_working_set_but_keeps_history() {
    let conn = open_db_in_memory().unwrap();
    let (baguette, croissant) = seed_bakery(&conn);
    SqliteSalesRepository::try_new(&conn)
        .unwrap()
        .upsert(&SaleObservation::new(croissant, day(), 6, 0))
        .unwrap();
    SqliteProductRepository::try_new(&conn)
        .unwrap()
        .deactivate_product(croissant)
        .unwrap();

    let mut session = SalesEntrySession::new(
        SqliteProductRepository::try_new(&conn).unwrap(),
        SqliteSalesRepository::try_new(&conn).unwrap(),
    );
    let result = session.select_date(day()).unwrap();

    assert_eq!(result.len(), 1);
    assert!(result.contains(baguette));
    assert!(!result.contains(croissant));
    assert!(result.has_prior_data());
    assert_eq!(result.inactive_history(), &[croissant]);
    assert!(result.violations().is_empty());
}
