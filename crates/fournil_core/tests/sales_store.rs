use fournil_core::db::open_db_in_memory;
use fournil_core::{
    NewProduct, ProductRepository, Quantities, RepoError, SaleDate, SaleObservation, SalesStore,
    SalesSummary, SqliteProductRepository, SqliteSalesRepository,
};
use rusqlite::Connection;

fn date(value: &str) -> SaleDate {
    SaleDate::parse(value).unwrap()
}

fn seed_products(conn: &Connection, names: &[&str]) -> Vec<i64> {
    let repo = SqliteProductRepository::try_new(conn).unwrap();
    names
        .iter()
        .map(|name| repo.create_product(&NewProduct::new(*name)).unwrap().id)
        .collect()
}

#[test]
fn read_for_empty_day_returns_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSalesRepository::try_new(&conn).unwrap();

    assert!(store.read_for_date(date("2024-06-01")).unwrap().is_empty());
}

#[test]
fn upsert_replaces_existing_row_instead_of_adding_one() {
    let conn = open_db_in_memory().unwrap();
    let ids = seed_products(&conn, &["Baguette"]);
    let store = SqliteSalesRepository::try_new(&conn).unwrap();
    let day = date("2024-06-01");

    store
        .upsert(&SaleObservation::new(ids[0], day, 30, 2))
        .unwrap();
    store
        .upsert(&SaleObservation::new(ids[0], day, 35, 2))
        .unwrap();

    let rows = store.read_for_date(day).unwrap();
    assert_eq!(rows, vec![SaleObservation::new(ids[0], day, 35, 2)]);
}

#[test]
fn repeated_upsert_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let ids = seed_products(&conn, &["Baguette", "Croissant"]);
    let store = SqliteSalesRepository::try_new(&conn).unwrap();
    let day = date("2024-06-01");

    let observation = SaleObservation::new(ids[1], day, 12, 4);
    store.upsert(&observation).unwrap();
    let once = store.read_for_date(day).unwrap();
    store.upsert(&observation).unwrap();
    let twice = store.read_for_date(day).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn reads_are_scoped_to_one_day_and_ordered_by_product() {
    let conn = open_db_in_memory().unwrap();
    let ids = seed_products(&conn, &["Baguette", "Croissant"]);
    let store = SqliteSalesRepository::try_new(&conn).unwrap();

    store
        .upsert(&SaleObservation::new(ids[1], date("2024-06-01"), 8, 1))
        .unwrap();
    store
        .upsert(&SaleObservation::new(ids[0], date("2024-06-01"), 20, 0))
        .unwrap();
    store
        .upsert(&SaleObservation::new(ids[0], date("2024-06-02"), 25, 3))
        .unwrap();

    let rows = store.read_for_date(date("2024-06-01")).unwrap();
    let products: Vec<_> = rows.iter().map(|row| row.product_id).collect();
    assert_eq!(products, vec![ids[0], ids[1]]);
    assert!(rows.iter().all(|row| row.date == date("2024-06-01")));
}

#[test]
fn upsert_for_missing_product_fails() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSalesRepository::try_new(&conn).unwrap();

    let err = store
        .upsert(&SaleObservation::new(77, date("2024-06-01"), 1, 0))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn corrupted_rows_surface_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let ids = seed_products(&conn, &["Baguette"]);
    conn.execute(
        "INSERT INTO daily_sales (product_id, sale_date, quantity_sold, quantity_unsold)
         VALUES (?1, '2024/06/01', 1, 0);",
        [ids[0]],
    )
    .unwrap();
    let store = SqliteSalesRepository::try_new(&conn).unwrap();

    assert!(store.read_for_date(date("2024-06-01")).unwrap().is_empty());
    let err = store.daily_totals_since(date("2024-01-01"), 5).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn daily_totals_sum_sold_quantities_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let ids = seed_products(&conn, &["Baguette", "Croissant"]);
    let store = SqliteSalesRepository::try_new(&conn).unwrap();

    for (day, sold) in [("2024-06-01", 10), ("2024-06-02", 20), ("2024-06-03", 30)] {
        store
            .upsert(&SaleObservation::new(ids[0], date(day), sold, 0))
            .unwrap();
        store
            .upsert(&SaleObservation::new(ids[1], date(day), 1, 5))
            .unwrap();
    }

    let totals = store.daily_totals_since(date("2024-06-02"), 5).unwrap();
    let pairs: Vec<_> = totals
        .iter()
        .map(|total| (total.date.to_string(), total.total_sold))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("2024-06-03".to_string(), 31),
            ("2024-06-02".to_string(), 21),
        ]
    );
    assert!(store.has_sales_on(date("2024-06-01")).unwrap());
    assert!(!store.has_sales_on(date("2024-05-31")).unwrap());
    assert_eq!(
        store.read_for_date(date("2024-06-03")).unwrap()[1].quantities,
        Quantities::new(1, 5)
    );
}
