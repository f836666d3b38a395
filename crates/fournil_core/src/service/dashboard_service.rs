//! Daily overview shown to the operator on start.
//!
//! # Invariants
//! - Recent totals cover days on or after `today - 5`, newest first,
//!   at most five rows.

use crate::model::sale::SaleDate;
use crate::repo::product_repo::ProductRepository;
use crate::repo::sales_repo::{DailyTotal, SalesSummary};
use crate::repo::RepoResult;

const RECENT_WINDOW_DAYS: u64 = 5;
const RECENT_TOTALS_LIMIT: u32 = 5;

/// Overview of the journal relative to one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardOverview {
    pub today: SaleDate,
    /// Whether sales for the day before `today` have been entered.
    pub yesterday_recorded: bool,
    pub active_products: u32,
    pub recent_totals: Vec<DailyTotal>,
}

/// Read-only dashboard facade.
pub struct DashboardService<P: ProductRepository, S: SalesSummary> {
    products: P,
    sales: S,
}

impl<P: ProductRepository, S: SalesSummary> DashboardService<P, S> {
    pub fn new(products: P, sales: S) -> Self {
        Self { products, sales }
    }

    pub fn overview(&self, today: SaleDate) -> RepoResult<DashboardOverview> {
        let yesterday = SaleDate::yesterday_of(today);
        let since = today.days_before(RECENT_WINDOW_DAYS).unwrap_or(today);

        Ok(DashboardOverview {
            today,
            yesterday_recorded: self.sales.has_sales_on(yesterday)?,
            active_products: self.products.count_active()?,
            recent_totals: self.sales.daily_totals_since(since, RECENT_TOTALS_LIMIT)?,
        })
    }
}
