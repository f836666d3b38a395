//! Daily sales observation store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read every observation recorded for one calendar day.
//! - Upsert one observation keyed by `(product_id, sale_date)`.
//! - Provide per-day aggregates for the dashboard.
//!
//! # Invariants
//! - At most one row exists per `(product_id, sale_date)`; a second write
//!   replaces the first.
//! - Repeating an upsert with the same values leaves quantities unchanged.

use crate::model::sale::{quantity_from_i64, SaleDate, SaleObservation};
use crate::repo::schema_check::ensure_table;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Keyed persistence for daily observations.
pub trait SalesStore {
    /// Returns observations for `date`, ordered by product id.
    fn read_for_date(&self, date: SaleDate) -> RepoResult<Vec<SaleObservation>>;
    /// Inserts or replaces the observation for `(product_id, date)`.
    fn upsert(&self, observation: &SaleObservation) -> RepoResult<()>;
}

impl<T: SalesStore + ?Sized> SalesStore for &T {
    fn read_for_date(&self, date: SaleDate) -> RepoResult<Vec<SaleObservation>> {
        (**self).read_for_date(date)
    }

    fn upsert(&self, observation: &SaleObservation) -> RepoResult<()> {
        (**self).upsert(observation)
    }
}

/// Total units sold across all products on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: SaleDate,
    pub total_sold: u64,
}

/// Aggregate read model over recorded sales.
pub trait SalesSummary {
    /// Whether any observation exists for `date`.
    fn has_sales_on(&self, date: SaleDate) -> RepoResult<bool>;
    /// Per-day sold totals for days on or after `since`, newest first.
    fn daily_totals_since(&self, since: SaleDate, limit: u32) -> RepoResult<Vec<DailyTotal>>;
}

/// SQLite-backed observation store.
pub struct SqliteSalesRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSalesRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(
            conn,
            "daily_sales",
            &[
                "product_id",
                "sale_date",
                "quantity_sold",
                "quantity_unsold",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl SalesStore for SqliteSalesRepository<'_> {
    fn read_for_date(&self, date: SaleDate) -> RepoResult<Vec<SaleObservation>> {
        let mut stmt = self.conn.prepare(
            "SELECT product_id, sale_date, quantity_sold, quantity_unsold
             FROM daily_sales
             WHERE sale_date = ?1
             ORDER BY product_id ASC;",
        )?;
        let mut rows = stmt.query([date.to_string()])?;
        let mut observations = Vec::new();
        while let Some(row) = rows.next()? {
            observations.push(parse_observation_row(row)?);
        }
        Ok(observations)
    }

    fn upsert(&self, observation: &SaleObservation) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO daily_sales (product_id, sale_date, quantity_sold, quantity_unsold)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(product_id, sale_date) DO UPDATE SET
                quantity_sold = excluded.quantity_sold,
                quantity_unsold = excluded.quantity_unsold,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                observation.product_id,
                observation.date.to_string(),
                observation.quantities.sold,
                observation.quantities.unsold,
            ],
        )?;
        Ok(())
    }
}

impl SalesSummary for SqliteSalesRepository<'_> {
    fn has_sales_on(&self, date: SaleDate) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM daily_sales WHERE sale_date = ?1);",
            [date.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn daily_totals_since(&self, since: SaleDate, limit: u32) -> RepoResult<Vec<DailyTotal>> {
        let mut stmt = self.conn.prepare(
            "SELECT sale_date, SUM(quantity_sold) AS total_sold
             FROM daily_sales
             WHERE sale_date >= ?1
             GROUP BY sale_date
             ORDER BY sale_date DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![since.to_string(), limit])?;
        let mut totals = Vec::new();
        while let Some(row) = rows.next()? {
            let date = parse_date_column(row)?;
            let total: i64 = row.get("total_sold")?;
            let total_sold = u64::try_from(total).map_err(|_| {
                RepoError::InvalidData(format!("negative sold total `{total}` on {date}"))
            })?;
            totals.push(DailyTotal { date, total_sold });
        }
        Ok(totals)
    }
}

fn parse_observation_row(row: &Row<'_>) -> RepoResult<SaleObservation> {
    let date = parse_date_column(row)?;
    let product_id = row.get("product_id")?;
    let sold = parse_quantity_column(row, "quantity_sold")?;
    let unsold = parse_quantity_column(row, "quantity_unsold")?;
    Ok(SaleObservation::new(product_id, date, sold, unsold))
}

fn parse_date_column(row: &Row<'_>) -> RepoResult<SaleDate> {
    let text: String = row.get("sale_date")?;
    SaleDate::parse(&text).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{text}` in daily_sales.sale_date"))
    })
}

fn parse_quantity_column(row: &Row<'_>, column: &'static str) -> RepoResult<u32> {
    let value: i64 = row.get(column)?;
    quantity_from_i64(value)
        .map_err(|err| RepoError::InvalidData(format!("{err} in daily_sales.{column}")))
}
