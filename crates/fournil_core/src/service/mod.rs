//! Core use-case services.
//!
//! # Responsibility
//! - Reconcile the catalog with one day's observations.
//! - Hold operator edits and commit them as per-product upserts.
//! - Keep UI/CLI layers decoupled from storage details.

pub mod commit;
pub mod dashboard_service;
pub mod edit_buffer;
pub mod reconcile;
pub mod sales_entry_service;
