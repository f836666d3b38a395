//! Commit of buffered edits as per-product upserts.
//!
//! # Responsibility
//! - Decide which buffered entries are write-worthy.
//! - Issue one upsert per write-worthy entry, sequentially in catalog order.
//! - Aggregate per-entry outcomes into a `WriteReport`.
//!
//! # Invariants
//! - All-zero entries are never sent to the store.
//! - A failed upsert never stops the remaining entries from being attempted.
//! - `overwritten` mirrors the load-time `has_prior_data` flag; it is not
//!   recomputed from which entries were written.
//! - No atomicity across entries: partial writes are reported, not rolled back.

use crate::model::product::ProductId;
use crate::model::sale::{SaleDate, SaleObservation};
use crate::repo::sales_repo::SalesStore;
use crate::service::edit_buffer::BufferSnapshot;
use log::{info, warn};
use std::time::Instant;

/// What happened to one buffered entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// All-zero entry; nothing was sent.
    Skipped,
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub product_id: ProductId,
    pub status: WriteStatus,
}

/// Result of one commit pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    date: SaleDate,
    overwritten: bool,
    outcomes: Vec<EntryOutcome>,
}

impl WriteReport {
    pub fn date(&self) -> SaleDate {
        self.date
    }

    /// Number of successful upserts.
    pub fn written_count(&self) -> usize {
        self.count(|status| matches!(status, WriteStatus::Written))
    }

    /// Number of write-worthy entries, written or failed.
    pub fn attempted_count(&self) -> usize {
        self.count(|status| !matches!(status, WriteStatus::Skipped))
    }

    /// Whether the day already had recorded data when it was loaded.
    pub fn overwritten(&self) -> bool {
        self.overwritten
    }

    /// Outcomes for every buffered entry, in catalog order.
    pub fn outcomes(&self) -> &[EntryOutcome] {
        &self.outcomes
    }

    /// Failed products with the store's reason.
    pub fn failures(&self) -> impl Iterator<Item = (ProductId, &str)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.status {
                WriteStatus::Failed { reason } => Some((outcome.product_id, reason.as_str())),
                _ => None,
            })
    }

    pub fn failed_ids(&self) -> Vec<ProductId> {
        self.failures().map(|(product_id, _)| product_id).collect()
    }

    /// True when every write-worthy entry was persisted.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Operator-facing message, e.g. `2 of 3 saved for 2024-06-01; failed products: 7`.
    pub fn summary(&self) -> String {
        let attempted = self.attempted_count();
        if attempted == 0 {
            return format!("nothing to save for {}", self.date);
        }

        let mut message = format!(
            "{} of {} saved for {}",
            self.written_count(),
            attempted,
            self.date
        );
        let failed = self.failed_ids();
        if !failed.is_empty() {
            let ids = failed
                .iter()
                .map(ProductId::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str(&format!("; failed products: {ids}"));
        }
        if self.overwritten {
            message.push_str(" (day was already recorded)");
        }
        message
    }

    fn count(&self, predicate: impl Fn(&WriteStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }
}

/// Persists every write-worthy entry of `snapshot` through `store`.
///
/// `has_prior_data` is the flag captured when the day was reconciled.
pub fn commit<S: SalesStore + ?Sized>(
    store: &S,
    snapshot: &BufferSnapshot,
    has_prior_data: bool,
) -> WriteReport {
    let started_at = Instant::now();
    let date = snapshot.date();
    info!(
        "event=sales_commit module=service status=start date={} entries={}",
        date,
        snapshot.entries().len()
    );

    let outcomes: Vec<EntryOutcome> = snapshot
        .entries()
        .iter()
        .map(|entry| {
            if !entry.quantities.is_write_worthy() {
                return EntryOutcome {
                    product_id: entry.product_id,
                    status: WriteStatus::Skipped,
                };
            }

            let observation = SaleObservation {
                product_id: entry.product_id,
                date,
                quantities: entry.quantities,
            };
            let status = match store.upsert(&observation) {
                Ok(()) => WriteStatus::Written,
                Err(err) => {
                    warn!(
                        "event=sales_upsert module=service status=error date={} product_id={} error={}",
                        date, entry.product_id, err
                    );
                    WriteStatus::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            EntryOutcome {
                product_id: entry.product_id,
                status,
            }
        })
        .collect();

    let report = WriteReport {
        date,
        overwritten: has_prior_data,
        outcomes,
    };
    info!(
        "event=sales_commit module=service status={} date={} written={} attempted={} overwritten={} duration_ms={}",
        if report.is_complete() { "ok" } else { "partial" },
        date,
        report.written_count(),
        report.attempted_count(),
        report.overwritten(),
        started_at.elapsed().as_millis()
    );
    report
}
