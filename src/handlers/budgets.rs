use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use axum_valid::Valid;
use chrono::{DateTime, NaiveDate, Utc};
use common::{BudgetStatus, DateRange};
use compute::default_analytics;
use model::entities::budget::{self, BudgetPeriod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::ApiError;
use crate::extract::{ValidJson, ValidQuery};
use crate::schemas::{AppState, ErrorResponse};

/// Request body for setting a category's budget
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateBudgetRequest {
    /// Expense category the budget applies to
    pub category_id: i32,
    /// Spending limit, greater than zero
    #[schema(value_type = f64, example = 500.0)]
    pub amount: Decimal,
    /// MONTHLY (default), WEEKLY or YEARLY
    #[serde(default)]
    #[schema(value_type = String, example = "MONTHLY")]
    pub period: BudgetPeriod,
}

/// Budget response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetResponse {
    pub budget_id: i32,
    pub category_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(value_type = String)]
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
}

impl From<budget::Model> for BudgetResponse {
    fn from(model: budget::Model) -> Self {
        Self {
            budget_id: model.id,
            category_id: model.category_id,
            amount: model.amount,
            period: model.period,
            created_at: model.created_at,
        }
    }
}

/// Inclusive date window. Missing ends default per endpoint.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// First date included (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Last date included (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

impl From<&DateRangeQuery> for DateRange {
    fn from(query: &DateRangeQuery) -> Self {
        DateRange::new(query.start_date, query.end_date)
    }
}

/// Create or replace the budget of an expense category
#[utoipa::path(
    post,
    path = "/budgets/",
    tag = "budgets",
    request_body = CreateBudgetRequest,
    responses(
        (status = 201, description = "Budget stored", body = BudgetResponse),
        (status = 400, description = "Unknown or non-expense category", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_budget(
    State(state): State<AppState>,
    WithRejection(Valid(Json(request)), _): ValidJson<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<BudgetResponse>), ApiError> {
    trace!("Entering create_budget function");
    let stored = budget::create_or_update(
        &state.db,
        request.category_id,
        request.amount,
        request.period,
    )
    .await?;
    info!("Budget {} stored for category {}", stored.id, stored.category_id);
    Ok((StatusCode::CREATED, Json(BudgetResponse::from(stored))))
}

/// List every budget with its spending status
#[utoipa::path(
    get,
    path = "/budgets/",
    tag = "budgets",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Budgets with spending, defaulting to the current month", body = Vec<BudgetStatus>)
    )
)]
#[instrument(skip(state))]
pub async fn list_budgets(
    State(state): State<AppState>,
    WithRejection(Valid(Query(query)), _): ValidQuery<DateRangeQuery>,
) -> Result<Json<Vec<BudgetStatus>>, ApiError> {
    trace!("Entering list_budgets function");
    let statuses = default_analytics(None)
        .budgets_with_status(&state.db, &DateRange::from(&query))
        .await?;
    debug!("Returning {} budget statuses", statuses.len());
    Ok(Json(statuses))
}
