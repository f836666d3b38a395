//! Merge of the active catalog with one day's recorded observations.
//!
//! # Responsibility
//! - Build a gap-filled working set with exactly one record per catalog product.
//! - Classify the day as fresh or previously recorded.
//! - Report collaborator contract violations instead of resolving them silently.
//! - Set aside history of deactivated products without flagging it.
//!
//! # Invariants
//! - The working set key domain equals the catalog id set: no omissions, no extras.
//! - `has_prior_data` is true iff the observation input was non-empty.
//! - Pure: same inputs give the same result, no I/O, no logging.

use crate::model::product::{Product, ProductId};
use crate::model::sale::{Quantities, SaleDate, SaleObservation, WorkingRecord};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Input that broke a catalog or store contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractViolation {
    /// The catalog listed the same id twice; the first entry was kept.
    DuplicateProduct { product_id: ProductId },
    /// The store returned two observations for one product; the last was kept.
    DuplicateObservation { product_id: ProductId },
    /// The store returned an observation for another day; it was ignored.
    ForeignDate {
        product_id: ProductId,
        date: SaleDate,
    },
    /// The store returned an observation for a product outside the catalog.
    UnknownProduct { product_id: ProductId },
}

impl ContractViolation {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateProduct { .. } => "duplicate_product",
            Self::DuplicateObservation { .. } => "duplicate_observation",
            Self::ForeignDate { .. } => "foreign_date",
            Self::UnknownProduct { .. } => "unknown_product",
        }
    }

    pub fn product_id(&self) -> ProductId {
        match self {
            Self::DuplicateProduct { product_id }
            | Self::DuplicateObservation { product_id }
            | Self::ForeignDate { product_id, .. }
            | Self::UnknownProduct { product_id } => *product_id,
        }
    }
}

impl Display for ContractViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateProduct { product_id } => {
                write!(f, "catalog lists product {product_id} more than once")
            }
            Self::DuplicateObservation { product_id } => write!(
                f,
                "store returned several observations for product {product_id}"
            ),
            Self::ForeignDate { product_id, date } => write!(
                f,
                "store returned an observation dated {date} for product {product_id}"
            ),
            Self::UnknownProduct { product_id } => write!(
                f,
                "store returned an observation for unknown product {product_id}"
            ),
        }
    }
}

/// Complete working set for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    date: SaleDate,
    records: Vec<WorkingRecord>,
    index: HashMap<ProductId, usize>,
    has_prior_data: bool,
    inactive_history: Vec<ProductId>,
    violations: Vec<ContractViolation>,
}

impl ReconciliationResult {
    pub fn date(&self) -> SaleDate {
        self.date
    }

    /// Working records in catalog order.
    pub fn records(&self) -> &[WorkingRecord] {
        &self.records
    }

    pub fn get(&self, product_id: ProductId) -> Option<&WorkingRecord> {
        self.index
            .get(&product_id)
            .map(|position| &self.records[*position])
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.index.contains_key(&product_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True for an empty catalog; a valid state, not a failure.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load-time snapshot; never re-evaluated after edits.
    pub fn has_prior_data(&self) -> bool {
        self.has_prior_data
    }

    /// Deactivated products that still have an observation for the day.
    ///
    /// Their rows stay out of the working set and are not violations.
    pub fn inactive_history(&self) -> &[ProductId] {
        &self.inactive_history
    }

    pub fn violations(&self) -> &[ContractViolation] {
        &self.violations
    }
}

/// Builds the working set for `date`.
///
/// Runs in time linear in `products.len() + observations.len()`. Products
/// without an observation get zero quantities.
pub fn reconcile(
    date: SaleDate,
    products: &[Product],
    observations: &[SaleObservation],
) -> ReconciliationResult {
    reconcile_with_inactive(date, products, &[], observations)
}

/// Same as [`reconcile`], with the ids of deactivated catalog products.
///
/// Observations for `inactive` ids go to `inactive_history` instead of
/// being reported as `UnknownProduct`.
pub fn reconcile_with_inactive(
    date: SaleDate,
    products: &[Product],
    inactive: &[ProductId],
    observations: &[SaleObservation],
) -> ReconciliationResult {
    let mut violations = Vec::new();
    let mut recorded: HashMap<ProductId, Quantities> = HashMap::with_capacity(observations.len());

    for observation in observations {
        if observation.date != date {
            violations.push(ContractViolation::ForeignDate {
                product_id: observation.product_id,
                date: observation.date,
            });
            continue;
        }
        if recorded
            .insert(observation.product_id, observation.quantities)
            .is_some()
        {
            violations.push(ContractViolation::DuplicateObservation {
                product_id: observation.product_id,
            });
        }
    }

    let mut records = Vec::with_capacity(products.len());
    let mut index = HashMap::with_capacity(products.len());
    for product in products {
        if index.contains_key(&product.id) {
            violations.push(ContractViolation::DuplicateProduct {
                product_id: product.id,
            });
            continue;
        }
        index.insert(product.id, records.len());
        records.push(WorkingRecord {
            product_id: product.id,
            name: product.name.clone(),
            quantities: recorded.remove(&product.id).unwrap_or_default(),
        });
    }

    let (mut inactive_history, mut unknown): (Vec<ProductId>, Vec<ProductId>) = recorded
        .into_keys()
        .partition(|product_id| inactive.contains(product_id));
    inactive_history.sort_unstable();
    unknown.sort_unstable();
    violations.extend(
        unknown
            .into_iter()
            .map(|product_id| ContractViolation::UnknownProduct { product_id }),
    );

    ReconciliationResult {
        date,
        records,
        index,
        has_prior_data: !observations.is_empty(),
        inactive_history,
        violations,
    }
}
