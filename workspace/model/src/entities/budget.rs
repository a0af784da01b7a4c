use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use super::category::{self, EntryType};
use super::transaction;
use crate::error::ModelError;

/// How often a budget's amount is meant to be spent.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetPeriod {
    #[default]
    #[sea_orm(string_value = "MONTHLY")]
    Monthly,
    #[sea_orm(string_value = "WEEKLY")]
    Weekly,
    #[sea_orm(string_value = "YEARLY")]
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "MONTHLY",
            BudgetPeriod::Weekly => "WEEKLY",
            BudgetPeriod::Yearly => "YEARLY",
        }
    }
}

/// Spending limit for one expense category. At most one per category.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub category_id: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub period: BudgetPeriod,
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

/// Sets the budget of an expense category.
///
/// An existing budget for the category is overwritten in place and keeps its
/// ID; otherwise a new row is inserted.
#[instrument(skip(db))]
pub async fn create_or_update(
    db: &DatabaseConnection,
    category_id: i32,
    amount: Decimal,
    period: BudgetPeriod,
) -> crate::Result<Model> {
    trace!("Entering budget::create_or_update");

    transaction::ensure_amount(amount)?;

    let Some(category) = category::find(db, category_id).await? else {
        warn!("Category {} not found", category_id);
        return Err(ModelError::BadRequest(format!(
            "Category with ID {} not found",
            category_id
        )));
    };
    if category.kind != EntryType::Expense {
        warn!("Category {} is not an expense category", category_id);
        return Err(ModelError::BadRequest(
            "Budgets can only be set for expense categories".to_string(),
        ));
    }

    let existing = Entity::find()
        .filter(Column::CategoryId.eq(category_id))
        .one(db)
        .await?;

    let budget = match existing {
        Some(existing) => {
            debug!("Overwriting budget {} for category {}", existing.id, category_id);
            let mut active: ActiveModel = existing.into();
            active.amount = Set(amount);
            active.period = Set(period);
            active.update(db).await?
        }
        None => ActiveModel {
            category_id: Set(category_id),
            amount: Set(amount),
            period: Set(period),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            ModelError::on_write(e, || {
                format!("Budget for category {} already exists", category_id)
            })
        })?,
    };

    info!(
        "Budget {} set for category {}: {} {}",
        budget.id,
        category_id,
        budget.amount,
        budget.period.as_str()
    );
    Ok(budget)
}

/// Returns all budgets ordered by ID.
#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection) -> crate::Result<Vec<Model>> {
    let budgets = Entity::find().order_by_asc(Column::Id).all(db).await?;
    debug!("Retrieved {} budgets", budgets.len());
    Ok(budgets)
}
