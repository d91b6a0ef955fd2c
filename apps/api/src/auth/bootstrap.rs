use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use baladiya_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::BootstrapRequest;
use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        tracing::warn!("rejected bootstrap sign-in with invalid token");
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let user = state
        .user_service
        .ensure_user(&payload.email, payload.display_name.as_deref())
        .await?;

    let identity = UserIdentity::new(
        user.user_id().to_string(),
        user.display_name(),
        user.email().as_str(),
    );

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    tracing::info!(user_id = %user.user_id(), role = %user.role(), "bootstrap sign-in");
    Ok(StatusCode::NO_CONTENT)
}
