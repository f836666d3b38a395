//! Domain model for the daily sales journal.
//!
//! # Responsibility
//! - Define the catalog, observation and working-set shapes used by services.
//! - Own value validation (calendar dates, non-negative quantities).
//!
//! # Invariants
//! - At most one `SaleObservation` exists per `(product_id, date)`.
//! - Dates never carry a time-of-day or timezone component.

pub mod product;
pub mod recommendation;
pub mod sale;
