//! Sales entry use-case: one date-selection episode at a time.
//!
//! # Responsibility
//! - Load the catalog and the day's observations, then reconcile them.
//! - Own the edit buffer for the selected day.
//! - Commit the buffer and keep the latest write report.
//!
//! # Invariants
//! - Selecting a date discards the previous episode unconditionally; edits
//!   are never carried over or merged.
//! - A store read failure leaves the session `Unloaded`; it is never
//!   treated as a day without data.
//! - Re-commit is allowed and re-runs the commit against the current buffer
//!   with the `has_prior_data` flag captured at load time.

use crate::model::product::ProductId;
use crate::model::sale::SaleDate;
use crate::repo::product_repo::ProductCatalog;
use crate::repo::sales_repo::SalesStore;
use crate::repo::RepoError;
use crate::service::commit::{commit, WriteReport};
use crate::service::edit_buffer::{EditBuffer, EditError, QuantityField};
use crate::service::reconcile::{reconcile_with_inactive, ReconciliationResult};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Observable phase of the current episode.
///
/// Reconciling and committing happen inside `select_date` and `commit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unloaded,
    Editable,
    Committed,
    PartiallyCommitted,
}

/// Errors from sales entry operations.
#[derive(Debug)]
pub enum SalesEntryError {
    /// An edit or commit was requested before a day was loaded.
    NoDateSelected,
    /// The product catalog could not be read.
    CatalogRead(RepoError),
    /// The observation store failed to return data for the day.
    StoreRead { date: SaleDate, source: RepoError },
    /// A buffer edit was rejected.
    Edit(EditError),
}

impl Display for SalesEntryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDateSelected => write!(f, "no sales date selected"),
            Self::CatalogRead(err) => write!(f, "failed to read product catalog: {err}"),
            Self::StoreRead { date, source } => {
                write!(f, "failed to read sales for {date}: {source}")
            }
            Self::Edit(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SalesEntryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoDateSelected => None,
            Self::CatalogRead(err) => Some(err),
            Self::StoreRead { source, .. } => Some(source),
            Self::Edit(err) => Some(err),
        }
    }
}

impl From<EditError> for SalesEntryError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}

struct Episode {
    reconciliation: ReconciliationResult,
    buffer: EditBuffer,
    phase: SessionPhase,
    last_report: Option<WriteReport>,
}

/// Sales entry session over a catalog and an observation store.
pub struct SalesEntrySession<C: ProductCatalog, S: SalesStore> {
    catalog: C,
    store: S,
    episode: Option<Episode>,
}

impl<C: ProductCatalog, S: SalesStore> SalesEntrySession<C, S> {
    pub fn new(catalog: C, store: S) -> Self {
        Self {
            catalog,
            store,
            episode: None,
        }
    }

    /// Starts a new episode for `date`, discarding any previous one.
    ///
    /// # Errors
    /// - `CatalogRead` or `StoreRead` when a collaborator fails; the session
    ///   stays `Unloaded`.
    pub fn select_date(
        &mut self,
        date: SaleDate,
    ) -> Result<&ReconciliationResult, SalesEntryError> {
        self.episode = None;
        let started_at = Instant::now();
        info!("event=sales_reconcile module=service status=start date={date}");

        let catalog_read = self
            .catalog
            .list_active()
            .and_then(|products| Ok((products, self.catalog.list_inactive_ids()?)));
        let (products, inactive) = catalog_read.map_err(|err| {
            error!(
                "event=sales_reconcile module=service status=error date={} error_code=catalog_read_failed error={}",
                date, err
            );
            SalesEntryError::CatalogRead(err)
        })?;
        let observations = self.store.read_for_date(date).map_err(|source| {
            error!(
                "event=sales_reconcile module=service status=error date={} error_code=store_read_failed error={}",
                date, source
            );
            SalesEntryError::StoreRead { date, source }
        })?;

        let reconciliation = reconcile_with_inactive(date, &products, &inactive, &observations);
        for violation in reconciliation.violations() {
            warn!(
                "event=reconcile_contract_violation module=service status=warn date={} product_id={} code={}",
                date,
                violation.product_id(),
                violation.code()
            );
        }
        info!(
            "event=sales_reconcile module=service status=ok date={} products={} observations={} inactive_history={} has_prior_data={} duration_ms={}",
            date,
            reconciliation.len(),
            observations.len(),
            reconciliation.inactive_history().len(),
            reconciliation.has_prior_data(),
            started_at.elapsed().as_millis()
        );

        let buffer = EditBuffer::from_reconciliation(&reconciliation);
        let episode = self.episode.insert(Episode {
            reconciliation,
            buffer,
            phase: SessionPhase::Editable,
            last_report: None,
        });
        Ok(&episode.reconciliation)
    }

    /// Drops the current episode and its unsaved edits.
    pub fn reset(&mut self) {
        self.episode = None;
    }

    pub fn phase(&self) -> SessionPhase {
        self.episode
            .as_ref()
            .map_or(SessionPhase::Unloaded, |episode| episode.phase)
    }

    pub fn date(&self) -> Option<SaleDate> {
        self.reconciliation().map(ReconciliationResult::date)
    }

    pub fn reconciliation(&self) -> Option<&ReconciliationResult> {
        self.episode.as_ref().map(|episode| &episode.reconciliation)
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        self.episode.as_ref().map(|episode| &episode.buffer)
    }

    pub fn last_report(&self) -> Option<&WriteReport> {
        self.episode
            .as_ref()
            .and_then(|episode| episode.last_report.as_ref())
    }

    pub fn set_sold(&mut self, product_id: ProductId, value: i64) -> Result<(), SalesEntryError> {
        self.edit(|buffer| buffer.set_sold(product_id, value))
    }

    pub fn set_unsold(&mut self, product_id: ProductId, value: i64) -> Result<(), SalesEntryError> {
        self.edit(|buffer| buffer.set_unsold(product_id, value))
    }

    /// Applies raw operator text to one quantity field.
    pub fn set_input(
        &mut self,
        product_id: ProductId,
        field: QuantityField,
        raw: &str,
    ) -> Result<(), SalesEntryError> {
        self.edit(|buffer| buffer.set_input(product_id, field, raw))
    }

    /// Persists the current buffer.
    ///
    /// Per-product write failures are reported in the returned report, not
    /// as an error.
    pub fn commit(&mut self) -> Result<WriteReport, SalesEntryError> {
        let episode = self
            .episode
            .as_mut()
            .ok_or(SalesEntryError::NoDateSelected)?;

        let report = commit(
            &self.store,
            &episode.buffer.snapshot(),
            episode.reconciliation.has_prior_data(),
        );
        episode.phase = if report.is_complete() {
            SessionPhase::Committed
        } else {
            SessionPhase::PartiallyCommitted
        };
        episode.last_report = Some(report.clone());
        Ok(report)
    }

    fn edit(
        &mut self,
        apply: impl FnOnce(&mut EditBuffer) -> Result<(), EditError>,
    ) -> Result<(), SalesEntryError> {
        let episode = self
            .episode
            .as_mut()
            .ok_or(SalesEntryError::NoDateSelected)?;
        apply(&mut episode.buffer)?;
        episode.phase = SessionPhase::Editable;
        Ok(())
    }
}
