use std::collections::HashMap;

use common::{BudgetStatus, DateRange, round_money};
use model::entities::{budget, category, transaction};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, info, instrument, trace};

use crate::error::{ComputeError, Result, checked_diff, checked_sum};
use crate::{Analytics, date_condition};

/// Share of `amount` that `spent` represents, in percent with one decimal.
///
/// Zero when the budget amount is not positive.
pub fn percentage_used(spent: Decimal, amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    spent
        .checked_div(amount)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|percent| percent.round_dp(1))
        .ok_or(ComputeError::Overflow("percentage used"))
}

impl Analytics {
    /// Every budget with what was spent in its category during `range`.
    ///
    /// A missing start or end falls back to the bounds of the current month.
    /// Transactions of either type count as spending.
    #[instrument(skip(self, db))]
    pub async fn budgets_with_status(
        &self,
        db: &DatabaseConnection,
        range: &DateRange,
    ) -> Result<Vec<BudgetStatus>> {
        trace!("Entering budgets_with_status");

        let (start, end) = range.or_month_of(self.today());
        let window = DateRange::new(Some(start), Some(end));
        debug!("Budget window: {} to {}", start, end);

        let budgets = budget::Entity::find()
            .order_by_asc(budget::Column::Id)
            .find_also_related(category::Entity)
            .all(db)
            .await?;
        if budgets.is_empty() {
            debug!("No budgets defined");
            return Ok(Vec::new());
        }

        let category_ids: Vec<i32> = budgets.iter().map(|(b, _)| b.category_id).collect();
        let transactions = transaction::Entity::find()
            .filter(date_condition(&window))
            .filter(transaction::Column::CategoryId.is_in(category_ids))
            .all(db)
            .await?;

        let mut spent_by_category: HashMap<i32, Decimal> = HashMap::new();
        for transaction in &transactions {
            let spent = spent_by_category
                .entry(transaction.category_id)
                .or_insert(Decimal::ZERO);
            *spent = checked_sum(*spent, transaction.amount, "budget spending")?;
        }

        let statuses = budgets
            .into_iter()
            .map(|(budget, category)| {
                let spent = spent_by_category
                    .get(&budget.category_id)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                Ok(BudgetStatus {
                    budget_id: budget.id,
                    category_id: budget.category_id,
                    category_name: category
                        .map(|c| c.name)
                        .unwrap_or_else(|| "Unknown".to_string()),
                    budget_amount: round_money(budget.amount),
                    period: budget.period.as_str().to_string(),
                    spent_amount: round_money(spent),
                    remaining: round_money(checked_diff(budget.amount, spent, "remaining budget")?),
                    percentage_used: percentage_used(spent, budget.amount)?,
                    is_over_budget: spent > budget.amount,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Budget status computed for {} budgets over {} transactions",
            statuses.len(),
            transactions.len()
        );
        Ok(statuses)
    }
}
