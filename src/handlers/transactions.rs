use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use axum_valid::Valid;
use chrono::{DateTime, NaiveDate, Utc};
use model::entities::category::EntryType;
use model::entities::transaction::{
    self, DEFAULT_PAGE_SIZE, NewTransaction, TransactionChanges, TransactionFilter,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::ApiError;
use crate::extract::{ApiPath, ValidJson, ValidQuery};
use crate::schemas::{AppState, ErrorResponse, MessageResponse};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request body for creating a transaction
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTransactionRequest {
    /// Must be greater than zero
    #[schema(value_type = f64, example = 42.5)]
    pub amount: Decimal,
    /// INCOME or EXPENSE
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "EXPENSE")]
    pub kind: EntryType,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub category_id: i32,
}

/// Request body for updating a transaction. Omitted fields stay unchanged;
/// a `null` description clears it.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateTransactionRequest {
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<EntryType>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    pub transaction_date: Option<NaiveDate>,
    pub category_id: Option<i32>,
}

impl From<UpdateTransactionRequest> for TransactionChanges {
    fn from(request: UpdateTransactionRequest) -> Self {
        Self {
            amount: request.amount,
            kind: request.kind,
            description: request.description,
            transaction_date: request.transaction_date,
            category_id: request.category_id,
        }
    }
}

/// Transaction response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub transaction_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub kind: EntryType,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<transaction::Model> for TransactionResponse {
    fn from(model: transaction::Model) -> Self {
        Self {
            transaction_id: model.id,
            amount: model.amount,
            kind: model.kind,
            description: model.description,
            transaction_date: model.transaction_date,
            category_id: model.category_id,
            created_at: model.created_at,
        }
    }
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ListTransactionsQuery {
    /// Number of transactions to skip (default 0)
    #[validate(range(max = 9223372036854775807u64, message = "is too large"))]
    pub skip: Option<u64>,
    /// Page size, 1 to 1000 (default 100)
    #[validate(range(min = 1, max = 1000, message = "must be between 1 and 1000"))]
    pub limit: Option<u64>,
    /// Earliest transaction date (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Latest transaction date (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<i32>,
    /// INCOME or EXPENSE
    #[serde(rename = "type")]
    #[param(value_type = Option<String>)]
    pub kind: Option<EntryType>,
}

impl From<ListTransactionsQuery> for TransactionFilter {
    fn from(query: ListTransactionsQuery) -> Self {
        Self {
            skip: query.skip.unwrap_or(0),
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            start_date: query.start_date,
            end_date: query.end_date,
            category_id: query.category_id,
            kind: query.kind,
        }
    }
}

/// List transactions, newest first
#[utoipa::path(
    get,
    path = "/transactions/",
    tag = "transactions",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Transactions ordered by date descending", body = Vec<TransactionResponse>),
        (status = 422, description = "Invalid query", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    WithRejection(Valid(Query(query)), _): ValidQuery<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    trace!("Entering list_transactions function");
    let filter = TransactionFilter::from(query);
    let transactions = transaction::list(&state.db, &filter).await?;
    debug!("Returning {} transactions", transactions.len());
    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}

/// Create a new transaction
#[utoipa::path(
    post,
    path = "/transactions/",
    tag = "transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created", body = TransactionResponse),
        (status = 400, description = "Unknown category", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_transaction(
    State(state): State<AppState>,
    WithRejection(Valid(Json(request)), _): ValidJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    trace!("Entering create_transaction function");
    let created = transaction::create(
        &state.db,
        NewTransaction {
            amount: request.amount,
            kind: request.kind,
            description: request.description,
            transaction_date: request.transaction_date,
            category_id: request.category_id,
        },
    )
    .await?;
    info!("Transaction created with ID: {}", created.id);
    Ok((StatusCode::CREATED, Json(TransactionResponse::from(created))))
}

/// Get a specific transaction by ID
#[utoipa::path(
    get,
    path = "/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    responses(
        (status = 200, description = "Transaction found", body = TransactionResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transaction(
    WithRejection(Path(transaction_id), _): ApiPath<i32>,
    State(state): State<AppState>,
) -> Result<Json<TransactionResponse>, ApiError> {
    trace!("Entering get_transaction function for transaction_id: {}", transaction_id);
    match transaction::find(&state.db, transaction_id).await? {
        Some(found) => Ok(Json(TransactionResponse::from(found))),
        None => {
            warn!("Transaction with ID {} not found", transaction_id);
            Err(ApiError::NotFound(format!(
                "Transaction with ID {} not found",
                transaction_id
            )))
        }
    }
}

/// Update a transaction (partial update)
#[utoipa::path(
    put,
    path = "/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated", body = TransactionResponse),
        (status = 400, description = "Unknown category", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_transaction(
    WithRejection(Path(transaction_id), _): ApiPath<i32>,
    State(state): State<AppState>,
    WithRejection(Valid(Json(request)), _): ValidJson<UpdateTransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    trace!("Entering update_transaction function for transaction_id: {}", transaction_id);
    let updated = transaction::update(&state.db, transaction_id, request.into()).await?;
    info!("Transaction {} updated", transaction_id);
    Ok(Json(TransactionResponse::from(updated)))
}

/// Delete a transaction
#[utoipa::path(
    delete,
    path = "/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    responses(
        (status = 200, description = "Transaction deleted", body = MessageResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_transaction(
    WithRejection(Path(transaction_id), _): ApiPath<i32>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!("Entering delete_transaction function for transaction_id: {}", transaction_id);
    transaction::delete(&state.db, transaction_id).await?;
    info!("Transaction {} deleted", transaction_id);
    Ok(Json(MessageResponse {
        message: format!("Transaction with ID {} successfully deleted", transaction_id),
        detail: Some(json!({ "transaction_id": transaction_id })),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_missing() {
        let missing: UpdateTransactionRequest = serde_json::from_str(r#"{"amount": 5}"#).unwrap();
        assert_eq!(missing.description, None);
        assert_eq!(missing.amount, Some(Decimal::new(5, 0)));

        let cleared: UpdateTransactionRequest =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdateTransactionRequest =
            serde_json::from_str(r#"{"description": "Lunch"}"#).unwrap();
        assert_eq!(set.description, Some(Some("Lunch".to_string())));
    }

    #[test]
    fn test_update_request_rejects_unknown_type_literal() {
        let parsed = serde_json::from_str::<UpdateTransactionRequest>(r#"{"type": "TRANSFER"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListTransactionsQuery {
            skip: None,
            limit: None,
            start_date: None,
            end_date: None,
            category_id: None,
            kind: None,
        };
        assert!(query.validate().is_ok());
        let filter = TransactionFilter::from(query);
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.limit, 100);
    }

    #[test]
    fn test_list_query_rejects_skip_beyond_store_range() {
        let mut query = ListTransactionsQuery {
            skip: Some(u64::MAX),
            limit: None,
            start_date: None,
            end_date: None,
            category_id: None,
            kind: None,
        };
        let errors = query.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("skip"));

        query.skip = Some(transaction::MAX_SKIP);
        assert!(query.validate().is_ok());
    }
}
