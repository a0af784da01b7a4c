use std::collections::HashMap;

use common::{CategoryBreakdown, DateRange, round_money};
use model::entities::category::{self, EntryType};
use model::entities::transaction;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, info, instrument, trace};

use crate::error::{Result, checked_sum};
use crate::{Analytics, date_condition};

impl Analytics {
    /// Per-category totals for the transactions in `range`.
    ///
    /// `kind` filters on the transaction type. Categories with no matching
    /// transactions are left out. The result is ordered by total descending,
    /// then category ID.
    #[instrument(skip(self, db))]
    pub async fn category_breakdown(
        &self,
        db: &DatabaseConnection,
        range: &DateRange,
        kind: Option<EntryType>,
    ) -> Result<Vec<CategoryBreakdown>> {
        trace!("Entering category_breakdown");

        let mut query = transaction::Entity::find().filter(date_condition(range));
        if let Some(kind) = kind {
            query = query.filter(transaction::Column::Kind.eq(kind));
        }
        let rows = query.find_also_related(category::Entity).all(db).await?;
        debug!("Grouping {} transactions by category", rows.len());

        // Group transactions by category and sum amounts
        let mut groups: HashMap<i32, (category::Model, Decimal, u64)> = HashMap::new();
        for (transaction, category) in rows {
            let Some(category) = category else {
                continue;
            };
            let entry = groups
                .entry(category.id)
                .or_insert_with(|| (category, Decimal::ZERO, 0));
            entry.1 = checked_sum(entry.1, transaction.amount, "category total")?;
            entry.2 += 1;
        }

        let mut breakdown: Vec<CategoryBreakdown> = groups
            .into_values()
            .map(|(category, total, count)| CategoryBreakdown {
                category_id: category.id,
                category_name: category.name,
                kind: category.kind.as_str().to_string(),
                total_amount: round_money(total),
                transaction_count: count,
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.total_amount
                .cmp(&a.total_amount)
                .then(a.category_id.cmp(&b.category_id))
        });

        info!("Category breakdown computed for {} categories", breakdown.len());
        Ok(breakdown)
    }
}
