use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use super::{budget, transaction};
use crate::error::ModelError;

/// Direction of money flow. Shared by categories and transactions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    #[sea_orm(string_value = "INCOME")]
    Income,
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "INCOME",
            EntryType::Expense => "EXPENSE",
        }
    }
}

/// Categories inserted on first start, in this order.
pub const DEFAULT_CATEGORIES: [(&str, EntryType); 15] = [
    ("Salary", EntryType::Income),
    ("Freelance", EntryType::Income),
    ("Investment", EntryType::Income),
    ("Gift", EntryType::Income),
    ("Other Income", EntryType::Income),
    ("Food & Dining", EntryType::Expense),
    ("Transportation", EntryType::Expense),
    ("Utilities", EntryType::Expense),
    ("Rent", EntryType::Expense),
    ("Entertainment", EntryType::Expense),
    ("Shopping", EntryType::Expense),
    ("Healthcare", EntryType::Expense),
    ("Education", EntryType::Expense),
    ("Travel", EntryType::Expense),
    ("Other Expense", EntryType::Expense),
];

/// A named bucket that transactions and budgets attach to.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    /// Whether the category collects income or expenses.
    #[sea_orm(column_name = "type")]
    pub kind: EntryType,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
    #[sea_orm(has_one = "super::budget::Entity")]
    Budget,
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Outcome of a cascading category delete.
#[derive(Clone, Debug, PartialEq)]
pub struct DeletedCategory {
    pub category: Model,
    pub transactions_removed: u64,
    pub budgets_removed: u64,
}

/// Looks up a category by ID.
pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> crate::Result<Option<Model>> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

/// Returns all categories ordered by type, then name.
#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection) -> crate::Result<Vec<Model>> {
    let categories = Entity::find()
        .order_by_asc(Column::Kind)
        .order_by_asc(Column::Name)
        .all(db)
        .await?;
    debug!("Retrieved {} categories", categories.len());
    Ok(categories)
}

/// Creates a category, rejecting duplicate names.
#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, name: &str, kind: EntryType) -> crate::Result<Model> {
    trace!("Entering category::create");

    let existing = Entity::find().filter(Column::Name.eq(name)).one(db).await?;
    if existing.is_some() {
        warn!("Category '{}' already exists", name);
        return Err(ModelError::Conflict(format!(
            "Category '{}' already exists",
            name
        )));
    }

    let category = ActiveModel {
        name: Set(name.to_string()),
        kind: Set(kind),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| ModelError::on_write(e, || format!("Category '{}' already exists", name)))?;

    info!(
        "Category created with ID: {}, name: {}, type: {}",
        category.id,
        category.name,
        category.kind.as_str()
    );
    Ok(category)
}

/// Inserts [`DEFAULT_CATEGORIES`] when the table is empty.
///
/// Returns the inserted rows, or an empty list when categories already exist.
#[instrument(skip(db))]
pub async fn seed_defaults(db: &DatabaseConnection) -> crate::Result<Vec<Model>> {
    let existing = Entity::find().count(db).await?;
    if existing > 0 {
        debug!("{} categories exist, skipping default seed", existing);
        return Ok(Vec::new());
    }

    let txn = db.begin().await?;
    let now = Utc::now();
    let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());
    for (name, kind) in DEFAULT_CATEGORIES {
        let category = ActiveModel {
            name: Set(name.to_string()),
            kind: Set(kind),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        created.push(category);
    }
    txn.commit().await?;

    info!("Seeded {} default categories", created.len());
    Ok(created)
}

/// Deletes a category together with its transactions and budget.
///
/// All three deletes run inside one database transaction.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> crate::Result<DeletedCategory> {
    trace!("Entering category::delete for id: {}", id);

    let txn = db.begin().await?;
    let Some(category) = Entity::find_by_id(id).one(&txn).await? else {
        warn!("Category {} not found", id);
        return Err(ModelError::NotFound {
            entity: "Category",
            id,
        });
    };

    let budgets = budget::Entity::delete_many()
        .filter(budget::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    let transactions = transaction::Entity::delete_many()
        .filter(transaction::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Category {} deleted along with {} transactions and {} budgets",
        id, transactions.rows_affected, budgets.rows_affected
    );
    Ok(DeletedCategory {
        category,
        transactions_removed: transactions.rows_affected,
        budgets_removed: budgets.rows_affected,
    })
}
