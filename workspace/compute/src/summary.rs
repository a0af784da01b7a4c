use common::{BalanceResponse, DateRange, SummaryResponse, round_money};
use model::entities::category::EntryType;
use model::entities::transaction;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, info, instrument, trace};

use crate::error::{Result, checked_diff, checked_sum};
use crate::{Analytics, date_condition};

/// Running income and expense sums.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Totals {
    pub income: Decimal,
    pub expenses: Decimal,
}

impl Totals {
    pub fn add(&mut self, kind: EntryType, amount: Decimal) -> Result<()> {
        match kind {
            EntryType::Income => self.income = checked_sum(self.income, amount, "income")?,
            EntryType::Expense => {
                self.expenses = checked_sum(self.expenses, amount, "expenses")?
            }
        }
        Ok(())
    }

    pub fn balance(&self) -> Result<Decimal> {
        checked_diff(self.income, self.expenses, "balance")
    }
}

impl Analytics {
    /// Income, expenses and balance of the transactions in `range`.
    #[instrument(skip(self, db))]
    pub async fn summary(&self, db: &DatabaseConnection, range: &DateRange) -> Result<SummaryResponse> {
        trace!("Entering summary");

        let transactions = transaction::Entity::find()
            .filter(date_condition(range))
            .all(db)
            .await?;
        debug!("Summarizing {} transactions", transactions.len());

        let mut totals = Totals::default();
        for transaction in &transactions {
            totals.add(transaction.kind, transaction.amount)?;
        }

        let summary = SummaryResponse {
            total_income: round_money(totals.income),
            total_expenses: round_money(totals.expenses),
            balance: round_money(totals.balance()?),
            transaction_count: transactions.len() as u64,
        };
        info!(
            "Summary computed: income {}, expenses {}, {} transactions",
            summary.total_income, summary.total_expenses, summary.transaction_count
        );
        Ok(summary)
    }

    /// Balance over every transaction ever recorded.
    #[instrument(skip(self, db))]
    pub async fn all_time_balance(&self, db: &DatabaseConnection) -> Result<BalanceResponse> {
        let transactions = transaction::Entity::find().all(db).await?;

        let mut totals = Totals::default();
        for transaction in &transactions {
            totals.add(transaction.kind, transaction.amount)?;
        }
        debug!("All-time totals over {} transactions: {:?}", transactions.len(), totals);

        Ok(BalanceResponse {
            balance: round_money(totals.balance()?),
            total_income: round_money(totals.income),
            total_expenses: round_money(totals.expenses),
        })
    }
}
