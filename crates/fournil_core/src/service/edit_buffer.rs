//! Pending per-product edits for the selected day.
//!
//! # Invariants
//! - Keys are fixed at seeding time and equal the working set keys.
//! - Invalid quantities are rejected before any mutation.
//! - Snapshots follow catalog order.

use crate::model::product::ProductId;
use crate::model::sale::{parse_quantity, quantity_from_i64, Quantities, QuantityError, SaleDate};
use crate::service::reconcile::ReconciliationResult;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which quantity of the pair an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityField {
    Sold,
    Unsold,
}

/// Rejected buffer edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    InvalidQuantity(QuantityError),
    /// Edits may only target products present in the working set.
    UnknownProduct(ProductId),
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuantity(err) => write!(f, "{err}"),
            Self::UnknownProduct(id) => write!(f, "product {id} is not part of this day's entry"),
        }
    }
}

impl Error for EditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuantity(err) => Some(err),
            Self::UnknownProduct(_) => None,
        }
    }
}

impl From<QuantityError> for EditError {
    fn from(value: QuantityError) -> Self {
        Self::InvalidQuantity(value)
    }
}

/// One buffered product entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferEntry {
    pub product_id: ProductId,
    pub quantities: Quantities,
}

/// Immutable copy of the buffer taken at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSnapshot {
    date: SaleDate,
    entries: Vec<BufferEntry>,
}

impl BufferSnapshot {
    pub fn date(&self) -> SaleDate {
        self.date
    }

    pub fn entries(&self) -> &[BufferEntry] {
        &self.entries
    }
}

/// Mutable mapping from product id to pending quantities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    date: SaleDate,
    entries: Vec<BufferEntry>,
    index: HashMap<ProductId, usize>,
}

impl EditBuffer {
    /// Seeds one entry per working record.
    pub fn from_reconciliation(result: &ReconciliationResult) -> Self {
        let entries: Vec<BufferEntry> = result
            .records()
            .iter()
            .map(|record| BufferEntry {
                product_id: record.product_id,
                quantities: record.quantities,
            })
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.product_id, position))
            .collect();

        Self {
            date: result.date(),
            entries,
            index,
        }
    }

    pub fn date(&self) -> SaleDate {
        self.date
    }

    pub fn get(&self, product_id: ProductId) -> Option<Quantities> {
        self.index
            .get(&product_id)
            .map(|position| self.entries[*position].quantities)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_sold(&mut self, product_id: ProductId, value: i64) -> Result<(), EditError> {
        self.set(product_id, QuantityField::Sold, value)
    }

    pub fn set_unsold(&mut self, product_id: ProductId, value: i64) -> Result<(), EditError> {
        self.set(product_id, QuantityField::Unsold, value)
    }

    /// Applies raw operator text; a blank field clears the quantity to zero.
    pub fn set_sold_input(&mut self, product_id: ProductId, raw: &str) -> Result<(), EditError> {
        self.set_input(product_id, QuantityField::Sold, raw)
    }

    pub fn set_unsold_input(&mut self, product_id: ProductId, raw: &str) -> Result<(), EditError> {
        self.set_input(product_id, QuantityField::Unsold, raw)
    }

    pub fn set(
        &mut self,
        product_id: ProductId,
        field: QuantityField,
        value: i64,
    ) -> Result<(), EditError> {
        let value = quantity_from_i64(value)?;
        self.store(product_id, field, value)
    }

    pub fn set_input(
        &mut self,
        product_id: ProductId,
        field: QuantityField,
        raw: &str,
    ) -> Result<(), EditError> {
        let value = parse_quantity(raw)?;
        self.store(product_id, field, value)
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            date: self.date,
            entries: self.entries.clone(),
        }
    }

    fn store(
        &mut self,
        product_id: ProductId,
        field: QuantityField,
        value: u32,
    ) -> Result<(), EditError> {
        let position = *self
            .index
            .get(&product_id)
            .ok_or(EditError::UnknownProduct(product_id))?;
        let quantities = &mut self.entries[position].quantities;
        match field {
            QuantityField::Sold => quantities.sold = value,
            QuantityField::Unsold => quantities.unsold = value,
        }
        Ok(())
    }
}
