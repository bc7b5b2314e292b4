use crate::domain::error::MintError;
use crate::transport::http::handlers::common::mint_error_response;
use crate::transport::http::types::{json_422, ApiResponse, AppState, ReconcileRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/users/{identity}",
    params(
        ("identity" = String, Path, description = "User identity (verified email)")
    ),
    responses(
        (status = 200, description = "Minted values, heaviest weightage first", body = ApiResponse),
        (status = 404, description = "User has never minted", body = ApiResponse),
        (status = 503, description = "Ledger unavailable", body = ApiResponse)
    )
)]
pub async fn get_profile_handler(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> impl IntoResponse {
    match state.ledger.get_user(identity.trim()).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({
                "identity": user.identity,
                "minted_values": user.ranked(),
            }))),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("No mint record for '{}'", identity))),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::err(format!("Ledger unavailable: {}", e))),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/users/{identity}/reconcile",
    params(
        ("identity" = String, Path, description = "User identity (verified email)")
    ),
    request_body = ReconcileRequest,
    responses(
        (status = 200, description = "Ledger and catalog now reflect the transaction", body = ApiResponse),
        (status = 409, description = "A mint is running for this identity", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Ledger sync failed again", body = ApiResponse)
    )
)]
pub async fn reconcile_handler(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    request: Result<Json<ReconcileRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"values\": [...], \"tx_hash\": \"...\"}").into_response()
        }
    };

    match state
        .mint_service
        .reconcile(&identity, &request.values, &request.tx_hash)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({
                "identity": identity.trim(),
                "tx_hash": request.tx_hash.trim(),
                "reconciled": true,
            }))),
        )
            .into_response(),
        Err(MintError::InvalidInput(detail)) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::err(detail))).into_response()
        }
        Err(e) => mint_error_response(&e).into_response(),
    }
}
