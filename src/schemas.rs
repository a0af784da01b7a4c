use std::sync::Arc;

use common::{BalanceResponse, BudgetStatus, CategoryBreakdown, MonthlyTrend, SummaryResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::auth::AuthKeys;
use crate::handlers::{
    auth::{LoginRequest, RegisterRequest, Token, UserResponse, VerifyResponse},
    budgets::{BudgetResponse, CreateBudgetRequest},
    categories::{CategoryResponse, CreateCategoryRequest},
    root::{ApiEndpoints, ApiInfo},
    transactions::{CreateTransactionRequest, TransactionResponse, UpdateTransactionRequest},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Password hashing and token signing keys
    pub auth: Arc<AuthKeys>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable error message
    pub detail: String,
    /// Machine readable error code
    pub code: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Confirmation of a destructive operation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    /// Operation specific details
    #[schema(value_type = Option<Object>)]
    pub detail: Option<serde_json::Value>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root::api_info,
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::login_json,
        crate::handlers::auth::me,
        crate::handlers::auth::verify,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::create_category,
        crate::handlers::categories::delete_category,
        crate::handlers::transactions::list_transactions,
        crate::handlers::transactions::create_transaction,
        crate::handlers::transactions::get_transaction,
        crate::handlers::transactions::update_transaction,
        crate::handlers::transactions::delete_transaction,
        crate::handlers::budgets::create_budget,
        crate::handlers::budgets::list_budgets,
        crate::handlers::analytics::get_summary,
        crate::handlers::analytics::get_category_breakdown,
        crate::handlers::analytics::get_monthly_trend,
        crate::handlers::analytics::get_balance,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            MessageResponse,
            ApiInfo,
            ApiEndpoints,
            RegisterRequest,
            LoginRequest,
            UserResponse,
            Token,
            VerifyResponse,
            CreateCategoryRequest,
            CategoryResponse,
            CreateTransactionRequest,
            UpdateTransactionRequest,
            TransactionResponse,
            CreateBudgetRequest,
            BudgetResponse,
            BudgetStatus,
            SummaryResponse,
            CategoryBreakdown,
            MonthlyTrend,
            BalanceResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "root", description = "API information"),
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and token verification"),
        (name = "categories", description = "Income and expense categories"),
        (name = "transactions", description = "Transaction CRUD endpoints"),
        (name = "budgets", description = "Budgets and spending status"),
        (name = "analytics", description = "Summaries, breakdowns and trends"),
    ),
    info(
        title = "Fintrack API",
        description = "Personal finance tracker: income and expense transactions, categories, budgets and analytics",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
