use crate::domain::error::MintError;
use crate::domain::mint::Notification;
use crate::domain::model::Project;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, warn};

/// Project pages are addressed by slug (`acme-labs-42`); the id is the last `-` segment.
pub fn project_id_from_slug(slug: &str) -> String {
    let slug = slug.trim();
    match slug.rsplit('-').next() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => slug.to_string(),
    }
}

/// Interprets a decimal base-unit balance. Returns whether the holder has any.
pub fn holds_balance(raw: &str) -> Result<bool, String> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("token_balance must be a non-negative integer, got '{}'", raw));
    }
    Ok(raw.chars().any(|c| c != '0'))
}

pub async fn load_project(
    state: &AppState,
    slug: &str,
) -> Result<Project, (StatusCode, Json<ApiResponse>)> {
    let id = project_id_from_slug(slug);
    match state.projects.get_project(&id).await {
        Ok(Some(project)) => Ok(project),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("Project '{}' not found", id))),
        )),
        Err(e) => {
            warn!(project_id = %id, error = %e, "project lookup failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::err(format!("Project lookup failed: {}", e))),
            ))
        }
    }
}

pub fn mint_error_status(e: &MintError) -> StatusCode {
    match e {
        MintError::InvalidInput(_) => StatusCode::INTERNAL_SERVER_ERROR,
        MintError::InvalidRecipient(_) => StatusCode::BAD_REQUEST,
        MintError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
        MintError::AlreadyInFlight(_) => StatusCode::CONFLICT,
        MintError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        MintError::ChainSubmissionFailed(_) => StatusCode::BAD_GATEWAY,
        MintError::LedgerSyncFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        MintError::Interrupted(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error envelope for a failed mint. Configuration problems are only described in the logs.
pub fn mint_error_response(e: &MintError) -> (StatusCode, Json<ApiResponse>) {
    let message = match e {
        MintError::InvalidInput(detail) => {
            error!(detail = %detail, "project configuration error");
            "Project configuration error".to_string()
        }
        other => other.to_string(),
    };
    let notification = Notification::for_error(e);
    (
        mint_error_status(e),
        Json(ApiResponse {
            success: false,
            data: Some(serde_json::json!({
                "status": "failed",
                "retry_safe": e.is_safe_to_retry(),
                "notification": notification,
            })),
            error: Some(message),
        }),
    )
}
