use crate::infra::solana::instruction::MAX_CID_LEN;
use crate::transport::http::types::{json_422, ApiResponse, AppState, RegisterValueRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

#[utoipa::path(
    get,
    path = "/api/values",
    responses(
        (status = 200, description = "Catalog keyed by lowercase value name", body = ApiResponse),
        (status = 503, description = "Catalog unavailable", body = ApiResponse)
    )
)]
pub async fn list_values_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.get_all_values().await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({
                "count": snapshot.len(),
                "values": snapshot,
            }))),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::err(format!("Catalog unavailable: {}", e))),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/values",
    request_body = RegisterValueRequest,
    responses(
        (status = 200, description = "Value registered or CID replaced", body = ApiResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn register_value_handler(
    State(state): State<AppState>,
    request: Result<Json<RegisterValueRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"value\": \"...\", \"cid\": \"...\"}").into_response(),
    };

    let cid = request.cid.trim();
    if request.value.trim().is_empty() || cid.is_empty() || cid.len() > MAX_CID_LEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err(format!(
                "value must be non-empty and cid between 1 and {} bytes",
                MAX_CID_LEN
            ))),
        )
            .into_response();
    }

    match state.catalog.upsert_value(&request.value, cid).await {
        Ok(record) => {
            info!(value = %record.key, cid = %record.cid, "catalog value registered");
            (
                StatusCode::OK,
                Json(ApiResponse::ok(serde_json::json!({ "value": record }))),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(e.to_string())),
        )
            .into_response(),
    }
}
