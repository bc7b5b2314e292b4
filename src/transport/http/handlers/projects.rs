use crate::app::MintRequest;
use crate::domain::mint::MintOutcome;
use crate::transport::http::handlers::common::{
    holds_balance, load_project, mint_error_response,
};
use crate::transport::http::types::{json_422, ApiResponse, AppState, MintRequestBody};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(
        ("id" = String, Path, description = "Project id or slug ending in the id (e.g. acme-labs-42)")
    ),
    responses(
        (status = 200, description = "Project found", body = ApiResponse),
        (status = 404, description = "Project not found", body = ApiResponse),
        (status = 503, description = "Project store unavailable", body = ApiResponse)
    )
)]
pub async fn get_project_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match load_project(&state, &id).await {
        Ok(project) => {
            let holding_noun = project.category.holding_noun();
            (
                StatusCode::OK,
                Json(ApiResponse::ok(serde_json::json!({
                    "project": project,
                    "holding_noun": holding_noun,
                }))),
            )
                .into_response()
        }
        Err(resp) => resp.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/mint",
    params(
        ("id" = String, Path, description = "Project id or slug ending in the id")
    ),
    request_body = MintRequestBody,
    responses(
        (status = 200, description = "Minted, partially minted, or nothing left to mint", body = ApiResponse),
        (status = 400, description = "No linked wallet or malformed balance", body = ApiResponse),
        (status = 401, description = "No authenticated identity", body = ApiResponse),
        (status = 403, description = "Wallet holds none of the project's asset", body = ApiResponse),
        (status = 404, description = "Project not found", body = ApiResponse),
        (status = 409, description = "A mint is already running for this identity", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 502, description = "Chain submission failed; nothing was minted", body = ApiResponse),
        (status = 503, description = "Mint state unavailable", body = ApiResponse)
    )
)]
pub async fn mint_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<MintRequestBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(
                e,
                "{\"identity\": ..., \"wallet_address\": ..., \"token_balance\": \"...\"}",
            )
            .into_response()
        }
    };

    let project = match load_project(&state, &id).await {
        Ok(p) => p,
        Err(resp) => return resp.into_response(),
    };

    let Some(identity) = request.identity.filter(|s| !s.trim().is_empty()) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::err("Link an email before minting values")),
        )
            .into_response();
    };
    let Some(wallet) = request.wallet_address.filter(|s| !s.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("Connect a wallet before minting values")),
        )
            .into_response();
    };
    match holds_balance(&request.token_balance) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::err(format!(
                    "You don't hold any {} from this project. You can connect a different wallet if you have it there.",
                    project.category.holding_noun()
                ))),
            )
                .into_response();
        }
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e))).into_response();
        }
    }

    let outcome = state
        .mint_service
        .mint(MintRequest {
            project_id: project.id.clone(),
            identity,
            recipient: wallet,
        })
        .await;

    match outcome {
        Ok(outcome) => {
            let receipt = outcome.receipt();
            info!(project_id = %project.id, status = outcome.status(), "mint finished");
            let mut data = serde_json::json!({
                "status": outcome.status(),
                "project_id": project.id,
                "values": receipt.map(|r| r.values.clone()).unwrap_or_default(),
                "tx_hash": receipt.map(|r| r.tx_hash.clone()),
                "notification": outcome.notification(),
            });
            if let MintOutcome::PartialSuccess { error, .. } = &outcome {
                data["reconciliation_required"] = serde_json::Value::Bool(true);
                data["warning"] = serde_json::Value::String(error.to_string());
            }
            (StatusCode::OK, Json(ApiResponse::ok(data))).into_response()
        }
        Err(e) => mint_error_response(&e).into_response(),
    }
}
