use crate::transport::http::handlers::{health, projects, users, values};
use crate::transport::http::types::{
    ApiResponse, MintRequestBody, ReconcileRequest, RegisterValueRequest,
};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        projects::get_project_handler,
        projects::mint_handler,
        values::list_values_handler,
        values::register_value_handler,
        users::get_profile_handler,
        users::reconcile_handler
    ),
    components(schemas(ApiResponse, MintRequestBody, RegisterValueRequest, ReconcileRequest))
)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/projects/:id", get(projects::get_project_handler))
        .route("/api/projects/:id/mint", post(projects::mint_handler))
        .route(
            "/api/values",
            get(values::list_values_handler).post(values::register_value_handler),
        )
        .route("/api/users/:identity", get(users::get_profile_handler))
        .route("/api/users/:identity/reconcile", post(users::reconcile_handler))
        .with_state(app_state)
}
