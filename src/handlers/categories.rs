use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::category::{self, EntryType};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiError;
use crate::extract::{ApiPath, ValidJson};
use crate::schemas::{AppState, ErrorResponse, MessageResponse};

/// Request body for creating a category
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCategoryRequest {
    /// Unique name
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    /// INCOME or EXPENSE
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "EXPENSE")]
    pub kind: EntryType,
}

/// Category response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub category_id: i32,
    pub name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "EXPENSE")]
    pub kind: EntryType,
    pub created_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            category_id: model.id,
            name: model.name,
            kind: model.kind,
            created_at: model.created_at,
        }
    }
}

/// Get all categories
#[utoipa::path(
    get,
    path = "/categories/",
    tag = "categories",
    responses(
        (status = 200, description = "Categories ordered by type, then name", body = Vec<CategoryResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    trace!("Entering list_categories function");
    let categories = category::list(&state.db).await?;
    debug!("Returning {} categories", categories.len());
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/categories/",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    WithRejection(Valid(Json(request)), _): ValidJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    trace!("Entering create_category function");
    let created = category::create(&state.db, &request.name, request.kind).await?;
    info!("Category created with ID: {}", created.id);
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(created))))
}

/// Delete a category along with its transactions and budget
#[utoipa::path(
    delete,
    path = "/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_category(
    WithRejection(Path(category_id), _): ApiPath<i32>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!("Entering delete_category function for category_id: {}", category_id);
    let deleted = category::delete(&state.db, category_id).await?;
    info!("Category {} deleted", category_id);

    Ok(Json(MessageResponse {
        message: format!("Category with ID {} successfully deleted", category_id),
        detail: Some(json!({
            "category_id": category_id,
            "transactions_deleted": deleted.transactions_removed,
            "budgets_deleted": deleted.budgets_removed,
        })),
    }))
}
