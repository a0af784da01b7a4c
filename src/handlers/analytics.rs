use axum::{
    extract::{Query, State},
    response::Json,
};
use axum_extra::extract::WithRejection;
use axum_valid::Valid;
use chrono::NaiveDate;
use common::{BalanceResponse, CategoryBreakdown, DateRange, MonthlyTrend, SummaryResponse};
use compute::default_analytics;
use model::entities::category::EntryType;
use serde::Deserialize;
use tracing::{debug, instrument, trace};
use utoipa::IntoParams;
use validator::Validate;

use crate::error::ApiError;
use crate::extract::ValidQuery;
use crate::handlers::budgets::DateRangeQuery;
use crate::schemas::{AppState, ErrorResponse};

/// Query parameters for the category breakdown
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct BreakdownQuery {
    /// First date included (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Last date included (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
    /// Only count transactions of this type (INCOME or EXPENSE)
    #[serde(rename = "type")]
    #[param(value_type = Option<String>)]
    pub kind: Option<EntryType>,
}

/// Query parameters for the monthly trend
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct TrendQuery {
    /// Number of months, 1 to 24 (default 6)
    #[validate(range(min = 1, max = 24, message = "must be between 1 and 24"))]
    pub months: Option<u32>,
}

const DEFAULT_TREND_MONTHS: u32 = 6;

/// Income vs expense summary for a period
#[utoipa::path(
    get,
    path = "/analytics/summary",
    tag = "analytics",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Totals over the period", body = SummaryResponse),
        (status = 422, description = "Invalid query", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    WithRejection(Valid(Query(query)), _): ValidQuery<DateRangeQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    trace!("Entering get_summary function");
    let summary = default_analytics(None)
        .summary(&state.db, &DateRange::from(&query))
        .await?;
    Ok(Json(summary))
}

/// Spending or income per category
#[utoipa::path(
    get,
    path = "/analytics/by-category",
    tag = "analytics",
    params(BreakdownQuery),
    responses(
        (status = 200, description = "Per-category totals, largest first", body = Vec<CategoryBreakdown>),
        (status = 422, description = "Invalid query", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category_breakdown(
    State(state): State<AppState>,
    WithRejection(Valid(Query(query)), _): ValidQuery<BreakdownQuery>,
) -> Result<Json<Vec<CategoryBreakdown>>, ApiError> {
    trace!("Entering get_category_breakdown function");
    let range = DateRange::new(query.start_date, query.end_date);
    let breakdown = default_analytics(None)
        .category_breakdown(&state.db, &range, query.kind)
        .await?;
    debug!("Returning {} category rows", breakdown.len());
    Ok(Json(breakdown))
}

/// Monthly income vs expense trend ending with the current month
#[utoipa::path(
    get,
    path = "/analytics/monthly-trend",
    tag = "analytics",
    params(TrendQuery),
    responses(
        (status = 200, description = "One entry per month, oldest first", body = Vec<MonthlyTrend>),
        (status = 422, description = "Invalid query", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_monthly_trend(
    State(state): State<AppState>,
    WithRejection(Valid(Query(query)), _): ValidQuery<TrendQuery>,
) -> Result<Json<Vec<MonthlyTrend>>, ApiError> {
    trace!("Entering get_monthly_trend function");
    let months = query.months.unwrap_or(DEFAULT_TREND_MONTHS);
    let trend = default_analytics(None)
        .monthly_trend(&state.db, months)
        .await?;
    Ok(Json(trend))
}

/// All-time balance
#[utoipa::path(
    get,
    path = "/analytics/balance",
    tag = "analytics",
    responses(
        (status = 200, description = "Balance over all transactions", body = BalanceResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_balance(State(state): State<AppState>) -> Result<Json<BalanceResponse>, ApiError> {
    trace!("Entering get_balance function");
    let balance = default_analytics(None).all_time_balance(&state.db).await?;
    Ok(Json(balance))
}
