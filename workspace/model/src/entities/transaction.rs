use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, QueryOrder, QuerySelect, Set};
use tracing::{debug, info, instrument, trace, warn};

use super::category::{self, EntryType};
use crate::error::ModelError;

/// Largest page a listing may return.
pub const MAX_PAGE_SIZE: u64 = 1000;
/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u64 = 100;
/// Largest offset the store accepts; bigger skips are clamped to it.
pub const MAX_SKIP: u64 = i64::MAX as u64;
/// Largest amount a DECIMAL(16,4) column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_874_919_423, 2_328_306, 0, false, 4);

/// A single income or expense entry.
///
/// The `kind` is stored independently of the category's type; the two are
/// allowed to disagree.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_name = "type")]
    pub kind: EntryType,
    pub description: Option<String>,
    pub transaction_date: Date,
    pub category_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields of a transaction about to be recorded.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub kind: EntryType,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub category_id: i32,
}

/// Partial update. `None` leaves a field untouched; for the description,
/// `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct TransactionChanges {
    pub amount: Option<Decimal>,
    pub kind: Option<EntryType>,
    pub description: Option<Option<String>>,
    pub transaction_date: Option<NaiveDate>,
    pub category_id: Option<i32>,
}

/// Listing filters, all optional and AND-combined.
#[derive(Clone, Debug)]
pub struct TransactionFilter {
    pub skip: u64,
    pub limit: u64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<i32>,
    pub kind: Option<EntryType>,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
            start_date: None,
            end_date: None,
            category_id: None,
            kind: None,
        }
    }
}

impl TransactionFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(start) = self.start_date {
            condition = condition.add(Column::TransactionDate.gte(start));
        }
        if let Some(end) = self.end_date {
            condition = condition.add(Column::TransactionDate.lte(end));
        }
        if let Some(category_id) = self.category_id {
            condition = condition.add(Column::CategoryId.eq(category_id));
        }
        if let Some(kind) = self.kind {
            condition = condition.add(Column::Kind.eq(kind));
        }
        condition
    }
}

/// Money amounts must be positive and fit the stored precision.
pub(crate) fn ensure_amount(amount: Decimal) -> crate::Result<()> {
    if amount <= Decimal::ZERO {
        return Err(ModelError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        warn!("Amount {} exceeds the storable maximum", amount);
        return Err(ModelError::BadRequest(format!(
            "Amount must not exceed {}",
            MAX_AMOUNT
        )));
    }
    Ok(())
}

async fn ensure_category<C: ConnectionTrait>(db: &C, category_id: i32) -> crate::Result<()> {
    if category::find(db, category_id).await?.is_none() {
        warn!("Category {} not found", category_id);
        return Err(ModelError::BadRequest(format!(
            "Category with ID {} not found",
            category_id
        )));
    }
    Ok(())
}

/// Records a new transaction.
#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, new: NewTransaction) -> crate::Result<Model> {
    trace!("Entering transaction::create");
    ensure_amount(new.amount)?;
    ensure_category(db, new.category_id).await?;

    let transaction = ActiveModel {
        amount: Set(new.amount),
        kind: Set(new.kind),
        description: Set(new.description),
        transaction_date: Set(new.transaction_date),
        category_id: Set(new.category_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Transaction created with ID: {}, amount: {}, category: {}",
        transaction.id, transaction.amount, transaction.category_id
    );
    Ok(transaction)
}

/// Lists transactions newest first.
#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, filter: &TransactionFilter) -> crate::Result<Vec<Model>> {
    let limit = filter.limit.clamp(1, MAX_PAGE_SIZE);
    let skip = filter.skip.min(MAX_SKIP);
    let transactions = Entity::find()
        .filter(filter.condition())
        .order_by_desc(Column::TransactionDate)
        .order_by_desc(Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?;
    debug!(
        "Retrieved {} transactions (skip: {}, limit: {})",
        transactions.len(),
        skip,
        limit
    );
    Ok(transactions)
}

/// Looks up a transaction by ID.
pub async fn find(db: &DatabaseConnection, id: i32) -> crate::Result<Option<Model>> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

/// Applies a partial update and returns the stored row.
#[instrument(skip(db))]
pub async fn update(db: &DatabaseConnection, id: i32, changes: TransactionChanges) -> crate::Result<Model> {
    trace!("Entering transaction::update for id: {}", id);

    let Some(existing) = Entity::find_by_id(id).one(db).await? else {
        warn!("Transaction {} not found", id);
        return Err(ModelError::NotFound {
            entity: "Transaction",
            id,
        });
    };

    if let Some(amount) = changes.amount {
        ensure_amount(amount)?;
    }
    if let Some(category_id) = changes.category_id {
        ensure_category(db, category_id).await?;
    }

    let mut active: ActiveModel = existing.clone().into();
    if let Some(amount) = changes.amount {
        active.amount = Set(amount);
    }
    if let Some(kind) = changes.kind {
        active.kind = Set(kind);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(date) = changes.transaction_date {
        active.transaction_date = Set(date);
    }
    if let Some(category_id) = changes.category_id {
        active.category_id = Set(category_id);
    }

    if !active.is_changed() {
        debug!("Transaction {} unchanged", id);
        return Ok(existing);
    }

    let updated = active.update(db).await?;
    info!("Transaction {} updated", id);
    Ok(updated)
}

/// Deletes a transaction.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> crate::Result<()> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        warn!("Transaction {} not found", id);
        return Err(ModelError::NotFound {
            entity: "Transaction",
            id,
        });
    }
    info!("Transaction {} deleted", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::setup_db;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn expense(amount: i64, date: NaiveDate, category_id: i32) -> NewTransaction {
        NewTransaction {
            amount: Decimal::new(amount, 0),
            kind: EntryType::Expense,
            description: None,
            transaction_date: date,
            category_id,
        }
    }

    async fn seeded() -> (DatabaseConnection, category::Model, category::Model) {
        let db = setup_db().await;
        let food = category::create(&db, "Food", EntryType::Expense)
            .await
            .unwrap();
        let salary = category::create(&db, "Salary", EntryType::Income)
            .await
            .unwrap();
        (db, food, salary)
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_amount() {
        let (db, food, _) = seeded().await;

        for amount in [0, -5] {
            let err = create(&db, expense(amount, day(1), food.id))
                .await
                .unwrap_err();
            assert!(matches!(err, ModelError::Validation(_)));
        }
        // Validation happens before the category lookup
        let err = create(&db, expense(0, day(1), 999)).await.unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));

        assert!(Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[test]
    fn test_max_amount_matches_column_precision() {
        assert_eq!(MAX_AMOUNT.to_string(), "999999999999.9999");
    }

    #[tokio::test]
    async fn test_amount_beyond_column_precision_is_rejected() {
        let (db, food, _) = seeded().await;

        let mut too_big = expense(0, day(1), food.id);
        too_big.amount = MAX_AMOUNT + Decimal::new(1, 4);
        let err = create(&db, too_big).await.unwrap_err();
        assert!(matches!(err, ModelError::BadRequest(_)));

        let mut huge = expense(0, day(1), food.id);
        huge.amount = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let err = create(&db, huge).await.unwrap_err();
        assert!(matches!(err, ModelError::BadRequest(_)));

        let mut largest = expense(0, day(1), food.id);
        largest.amount = MAX_AMOUNT;
        let stored = create(&db, largest).await.unwrap();
        assert_eq!(stored.amount, MAX_AMOUNT);

        let changes = TransactionChanges {
            amount: Some(MAX_AMOUNT * Decimal::TWO),
            ..Default::default()
        };
        let err = update(&db, stored.id, changes).await.unwrap_err();
        assert!(matches!(err, ModelError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_list_clamps_oversized_skip() {
        let (db, food, _) = seeded().await;
        create(&db, expense(10, day(1), food.id)).await.unwrap();

        let filter = TransactionFilter {
            skip: u64::MAX,
            ..Default::default()
        };
        assert!(list(&db, &filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_existing_category() {
        let (db, _, _) = seeded().await;

        let err = create(&db, expense(10, day(1), 999)).await.unwrap_err();
        assert!(matches!(err, ModelError::BadRequest(_)));
        assert_eq!(err.to_string(), "Category with ID 999 not found");
    }

    #[tokio::test]
    async fn test_create_allows_type_mismatch_with_category() {
        let (db, _, salary) = seeded().await;

        let tx = create(&db, expense(15, day(2), salary.id)).await.unwrap();
        assert_eq!(tx.kind, EntryType::Expense);
        assert_eq!(tx.category_id, salary.id);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_respects_limit() {
        let (db, food, _) = seeded().await;
        for d in [3, 10, 1, 10, 7] {
            create(&db, expense(d as i64, day(d), food.id)).await.unwrap();
        }

        let all = list(&db, &TransactionFilter::default()).await.unwrap();
        assert_eq!(all.len(), 5);
        assert!(
            all.windows(2)
                .all(|w| w[0].transaction_date >= w[1].transaction_date)
        );
        // Same day falls back to id descending
        assert_eq!(all[0].transaction_date, day(10));
        assert!(all[0].id > all[1].id);

        let page = list(
            &db,
            &TransactionFilter {
                skip: 1,
                limit: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, all[1].id);
        assert_eq!(page[1].id, all[2].id);
    }

    #[tokio::test]
    async fn test_list_combines_filters() {
        let (db, food, salary) = seeded().await;
        create(&db, expense(10, day(1), food.id)).await.unwrap();
        create(&db, expense(20, day(5), food.id)).await.unwrap();
        create(&db, expense(30, day(9), food.id)).await.unwrap();
        create(
            &db,
            NewTransaction {
                kind: EntryType::Income,
                ..expense(1000, day(5), salary.id)
            },
        )
        .await
        .unwrap();

        let ranged = list(
            &db,
            &TransactionFilter {
                start_date: Some(day(2)),
                end_date: Some(day(9)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ranged.len(), 3);

        let food_only = list(
            &db,
            &TransactionFilter {
                start_date: Some(day(2)),
                end_date: Some(day(9)),
                category_id: Some(food.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let amounts: Vec<Decimal> = food_only.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![Decimal::new(30, 0), Decimal::new(20, 0)]);

        let income = list(
            &db,
            &TransactionFilter {
                kind: Some(EntryType::Income),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].category_id, salary.id);
    }

    #[tokio::test]
    async fn test_update_changes_only_supplied_fields() {
        let (db, food, salary) = seeded().await;
        let tx = create(
            &db,
            NewTransaction {
                description: Some("Lunch".to_string()),
                ..expense(12, day(4), food.id)
            },
        )
        .await
        .unwrap();

        let updated = update(
            &db,
            tx.id,
            TransactionChanges {
                amount: Some(Decimal::new(1550, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.amount, Decimal::new(1550, 2));
        assert_eq!(updated.description.as_deref(), Some("Lunch"));
        assert_eq!(updated.transaction_date, day(4));

        let moved = update(
            &db,
            tx.id,
            TransactionChanges {
                category_id: Some(salary.id),
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.category_id, salary.id);
        assert_eq!(moved.description, None);

        let unchanged = update(&db, tx.id, TransactionChanges::default())
            .await
            .unwrap();
        assert_eq!(unchanged.id, moved.id);
        assert_eq!(unchanged.category_id, salary.id);
        assert_eq!(unchanged.amount, Decimal::new(1550, 2));
    }

    #[tokio::test]
    async fn test_update_error_cases() {
        let (db, food, _) = seeded().await;
        let tx = create(&db, expense(12, day(4), food.id)).await.unwrap();

        let err = update(&db, 999, TransactionChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::NotFound {
                entity: "Transaction",
                ..
            }
        ));

        let err = update(
            &db,
            tx.id,
            TransactionChanges {
                category_id: Some(999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ModelError::BadRequest(_)));

        let err = update(
            &db,
            tx.id,
            TransactionChanges {
                amount: Some(Decimal::ZERO),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));

        let stored = find(&db, tx.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, Decimal::new(12, 0));
        assert_eq!(stored.category_id, food.id);
    }

    #[tokio::test]
    async fn test_delete_twice_fails_second_time() {
        let (db, food, _) = seeded().await;
        let tx = create(&db, expense(12, day(4), food.id)).await.unwrap();

        delete(&db, tx.id).await.unwrap();
        assert!(find(&db, tx.id).await.unwrap().is_none());

        let err = delete(&db, tx.id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Transaction with ID {} not found", tx.id));
    }
}
