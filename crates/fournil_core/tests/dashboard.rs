use fournil_core::db::open_db_in_memory;
use fournil_core::{
    DashboardService, NewProduct, ProductRepository, SaleDate, SaleObservation, SalesStore,
    SqliteProductRepository, SqliteSalesRepository,
};

fn date(value: &str) -> SaleDate {
    SaleDate::parse(value).unwrap()
}

#[test]
fn overview_on_empty_journal() {
    let conn = open_db_in_memory().unwrap();
    let service = DashboardService::new(
        SqliteProductRepository::try_new(&conn).unwrap(),
        SqliteSalesRepository::try_new(&conn).unwrap(),
    );

    let overview = service.overview(date("2024-06-10")).unwrap();
    assert!(!overview.yesterday_recorded);
    assert_eq!(overview.active_products, 0);
    assert!(overview.recent_totals.is_empty());
}

#[test]
fn overview_reports_yesterday_and_recent_window() {
    let conn = open_db_in_memory().unwrap();
    let products = SqliteProductRepository::try_new(&conn).unwrap();
    let baguette = products
        .create_product(&NewProduct::new("Baguette"))
        .unwrap();
    let brioche = products
        .create_product(&NewProduct::new("Brioche"))
        .unwrap();
    products.deactivate_product(brioche.id).unwrap();

    let store = SqliteSalesRepository::try_new(&conn).unwrap();
    for (day, sold) in [
        ("2024-06-01", 1),
        ("2024-06-04", 4),
        ("2024-06-05", 5),
        ("2024-06-09", 9),
    ] {
        store
            .upsert(&SaleObservation::new(baguette.id, date(day), sold, 0))
            .unwrap();
    }

    let service = DashboardService::new(products, store);
    let overview = service.overview(date("2024-06-10")).unwrap();

    assert!(overview.yesterday_recorded);
    assert_eq!(overview.active_products, 1);
    let days: Vec<_> = overview
        .recent_totals
        .iter()
        .map(|total| (total.date.to_string(), total.total_sold))
        .collect();
    assert_eq!(
        days,
        vec![("2024-06-09".to_string(), 9), ("2024-06-05".to_string(), 5)]
    );
}
