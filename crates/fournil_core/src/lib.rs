//! Core domain logic for the Fournil sales journal.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::product::{
    BusinessImportance, NewProduct, Product, ProductId, ProductRecord, ProductValidationError,
};
pub use model::recommendation::{Recommendation, RecommendationBatch, RecommendationError};
pub use model::sale::{
    parse_quantity, Quantities, QuantityError, SaleDate, SaleDateError, SaleObservation,
    WorkingRecord,
};
pub use repo::product_repo::{ProductCatalog, ProductRepository, SqliteProductRepository};
pub use repo::sales_repo::{DailyTotal, SalesStore, SalesSummary, SqliteSalesRepository};
pub use repo::{RepoError, RepoResult};
pub use service::commit::{commit, EntryOutcome, WriteReport, WriteStatus};
pub use service::dashboard_service::{DashboardOverview, DashboardService};
pub use service::edit_buffer::{BufferEntry, BufferSnapshot, EditBuffer, EditError, QuantityField};
pub use service::reconcile::{
    reconcile, reconcile_with_inactive, ContractViolation, ReconciliationResult,
};
pub use service::sales_entry_service::{SalesEntryError, SalesEntrySession, SessionPhase};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
