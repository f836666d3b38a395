//! Product catalog model.
//!
//! # Responsibility
//! - Define the catalog entry consumed by reconciliation (`Product`).
//! - Define the full catalog record and creation input used by the repository.
//!
//! # Invariants
//! - `id` is assigned by storage, stable, and never reused.
//! - `name` is non-blank after trimming.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable product identifier assigned by the catalog.
pub type ProductId = i64;

/// Catalog entry as seen by sales entry: id and display name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// How central a product is to the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessImportance {
    /// Core of the offer, produced daily.
    #[default]
    Core,
    Secondary,
    /// Produced when an opportunity arises.
    Opportunistic,
}

impl BusinessImportance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Secondary => "secondary",
            Self::Opportunistic => "opportunistic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "core" => Some(Self::Core),
            "secondary" => Some(Self::Secondary),
            "opportunistic" => Some(Self::Opportunistic),
            _ => None,
        }
    }
}

/// Full catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub importance: BusinessImportance,
    /// Inactive products keep their sales history but leave sales entry.
    pub active: bool,
}

/// Input for creating a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub importance: BusinessImportance,
}

impl NewProduct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_importance(mut self, importance: BusinessImportance) -> Self {
        self.importance = importance;
        self
    }

    /// Returns a trimmed copy, or an error when the name is blank.
    ///
    /// A blank category is normalized to `None`.
    pub fn normalized(&self) -> Result<Self, ProductValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductValidationError::BlankName);
        }
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            category,
            importance: self.importance,
        })
    }
}

/// Product validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    BlankName,
}

impl Display for ProductValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "product name must not be blank"),
        }
    }
}

impl Error for ProductValidationError {}
