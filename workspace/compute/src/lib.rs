//! Aggregate computations over the transactions table: period summaries,
//! per-category breakdowns, monthly trends and budget status.

pub mod budgets;
pub mod categories;
pub mod error;
pub mod summary;
pub mod trend;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{NaiveDate, Utc};
use common::DateRange;
use model::entities::transaction;
use sea_orm::{ColumnTrait, Condition};

pub use error::{ComputeError, Result};

/// The analytics engine.
///
/// Everything that depends on the current date (the trend window, the
/// default budget period) is resolved against `today`.
#[derive(Debug, Clone, Copy)]
pub struct Analytics {
    today: NaiveDate,
}

impl Analytics {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }
}

/// Returns the analytics engine used by the API.
///
/// This function uses the provided date as "today" or the current UTC date if none is provided.
pub fn default_analytics(today: Option<NaiveDate>) -> Analytics {
    Analytics::new(today.unwrap_or_else(|| Utc::now().date_naive()))
}

/// Inclusive date filter on `transactions.transaction_date`.
pub(crate) fn date_condition(range: &DateRange) -> Condition {
    let mut condition = Condition::all();
    if let Some(start) = range.start {
        condition = condition.add(transaction::Column::TransactionDate.gte(start));
    }
    if let Some(end) = range.end {
        condition = condition.add(transaction::Column::TransactionDate.lte(end));
    }
    condition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analytics_uses_given_today() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 22).unwrap();
        assert_eq!(default_analytics(Some(today)).today(), today);
    }

    #[test]
    fn test_default_analytics_falls_back_to_current_date() {
        let analytics = default_analytics(None);
        assert_eq!(analytics.today(), Utc::now().date_naive());
    }
}
