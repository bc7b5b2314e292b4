use crate::app::MintService;
use crate::storage::{ProjectSource, UserMintRecordSource, ValueCatalogSource};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub mint_service: Arc<MintService>,
    pub projects: Arc<dyn ProjectSource>,
    pub catalog: Arc<dyn ValueCatalogSource>,
    pub ledger: Arc<dyn UserMintRecordSource>,
    /// Present when the stores are Postgres-backed; used by `/health`.
    pub db_pool: Option<PgPool>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Mint request from the presentation layer.
///
/// `identity` is the verified email of the signed-in user and `wallet_address`
/// the wallet they linked; both come from the identity provider.
#[derive(Deserialize, Debug, ToSchema)]
pub struct MintRequestBody {
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    /// Holder's balance of the project's gating asset, in base units, as a decimal string.
    pub token_balance: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterValueRequest {
    pub value: String,
    pub cid: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ReconcileRequest {
    /// Values minted in `tx_hash` that are missing from the ledger.
    pub values: Vec<String>,
    pub tx_hash: String,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::err(format!(
            "Invalid JSON body: {} (expected: {})",
            err, expected
        ))),
    )
}
