//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the catalog and observation-store contracts consumed by services.
//! - Isolate SQLite query details from reconciliation and commit logic.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Observation writes are upserts keyed by `(product_id, sale_date)`.

use crate::db::DbError;
use crate::model::product::{ProductId, ProductValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod product_repo;
pub mod sales_repo;
mod schema_check;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by catalog and sales persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProductValidationError),
    Db(DbError),
    NotFound(ProductId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "product not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "database is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProductValidationError> for RepoError {
    fn from(value: ProductValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
