use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};
use utoipa::ToSchema;

/// Entry points of each endpoint group
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiEndpoints {
    pub auth: String,
    pub categories: String,
    pub transactions: String,
    pub budgets: String,
    pub analytics: String,
}

/// API information
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    /// Location of the interactive documentation
    pub docs: String,
    pub endpoints: ApiEndpoints,
}

/// Describe the API
#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses(
        (status = 200, description = "API information", body = ApiInfo)
    )
)]
#[instrument]
pub async fn api_info() -> Json<ApiInfo> {
    trace!("Entering api_info function");
    Json(ApiInfo {
        message: "Personal Finance Tracker API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/swagger-ui".to_string(),
        endpoints: ApiEndpoints {
            auth: "/auth/".to_string(),
            categories: "/categories/".to_string(),
            transactions: "/transactions/".to_string(),
            budgets: "/budgets/".to_string(),
            analytics: "/analytics/".to_string(),
        },
    })
}
