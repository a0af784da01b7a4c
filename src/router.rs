use crate::handlers::{
    analytics::{get_balance, get_category_breakdown, get_monthly_trend, get_summary},
    auth::{login, login_json, me, register, verify},
    budgets::{create_budget, list_budgets},
    categories::{create_category, delete_category, list_categories},
    health::health_check,
    root::api_info,
    transactions::{
        create_transaction, delete_transaction, get_transaction, list_transactions,
        update_transaction,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_info))
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/login/json", post(login_json))
        .route("/auth/me", get(me))
        .route("/auth/verify", get(verify))
        // Categories
        .route("/categories/", get(list_categories).post(create_category))
        .route("/categories/:category_id", delete(delete_category))
        // Transactions
        .route("/transactions/", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/:transaction_id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        // Budgets
        .route("/budgets/", get(list_budgets).post(create_budget))
        // Analytics
        .route("/analytics/summary", get(get_summary))
        .route("/analytics/by-category", get(get_category_breakdown))
        .route("/analytics/monthly-trend", get(get_monthly_trend))
        .route("/analytics/balance", get(get_balance))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
