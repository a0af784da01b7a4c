use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use common::{DateRange, MonthlyTrend, month_bounds, month_name, round_money};
use model::entities::transaction;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{ComputeError, Result};
use crate::summary::Totals;
use crate::{Analytics, date_condition};

/// The `count` calendar months ending with the month of `today`, oldest first.
///
/// Walks backwards one month at a time, wrapping from January to December
/// of the previous year.
pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<(i32, u32)> {
    let mut months = Vec::with_capacity(count as usize);
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..count {
        months.push((year, month));
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }
    months.reverse();
    months
}

impl Analytics {
    /// Income and expenses for each of the last `months` months.
    ///
    /// Always returns exactly `months` entries; months without transactions
    /// are zero.
    #[instrument(skip(self, db))]
    pub async fn monthly_trend(&self, db: &DatabaseConnection, months: u32) -> Result<Vec<MonthlyTrend>> {
        trace!("Entering monthly_trend");
        if months == 0 {
            warn!("Monthly trend requested for zero months");
            return Err(ComputeError::InvalidWindow(
                "Number of months must be at least 1".to_string(),
            ));
        }

        let window = trailing_months(self.today(), months);
        let (Some(&(first_year, first_month)), Some(&(last_year, last_month))) =
            (window.first(), window.last())
        else {
            return Ok(Vec::new());
        };
        let span = DateRange::new(
            Some(month_bounds(first_year, first_month).0),
            Some(month_bounds(last_year, last_month).1),
        );
        debug!("Trend window spans {:?}", span);

        let transactions = transaction::Entity::find()
            .filter(date_condition(&span))
            .all(db)
            .await?;

        let mut buckets: HashMap<(i32, u32), Totals> = HashMap::new();
        for transaction in &transactions {
            let date = transaction.transaction_date;
            buckets
                .entry((date.year(), date.month()))
                .or_default()
                .add(transaction.kind, transaction.amount)?;
        }

        let trend = window
            .into_iter()
            .map(|(year, month)| {
                let totals = buckets.get(&(year, month)).copied().unwrap_or_default();
                Ok(MonthlyTrend {
                    month: month_name(month).to_string(),
                    year,
                    income: round_money(totals.income),
                    expenses: round_money(totals.expenses),
                    balance: round_money(totals.balance()?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Monthly trend computed for {} months from {} transactions",
            trend.len(),
            transactions.len()
        );
        Ok(trend)
    }
}
