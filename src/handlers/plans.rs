use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::plans::{self, Plan};
use crate::{ApiResponse, ApiResult};
use axum::{
    extract::{Json, Path},
    routing::get,
    Router,
};

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/plans/:plan_id", get(get_plan))
}

/// List subscription plans
#[utoipa::path(
    get,
    path = "/api/v1/plans",
    responses((status = 200, description = "All subscription plans")),
    tag = "Plans"
)]
pub async fn list_plans() -> Json<ApiResponse<&'static [Plan]>> {
    Json(ApiResponse::success(plans::all_plans()))
}

/// Get a subscription plan by id
#[utoipa::path(
    get,
    path = "/api/v1/plans/{plan_id}",
    params(("plan_id" = String, Path, description = "Plan id, e.g. pet-pharmacies")),
    responses(
        (status = 200, description = "Plan details"),
        (status = 404, description = "Unknown plan", body = crate::errors::ErrorResponse)
    ),
    tag = "Plans"
)]
pub async fn get_plan(
    Path(plan_id): Path<String>,
) -> ApiResult<&'static Plan> {
    plans::find_plan(&plan_id)
        .map(|plan| Json(ApiResponse::success(plan)))
        .ok_or_else(|| ServiceError::NotFound(format!("plan {} not found", plan_id)))
}
