use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use baladiya_core::{AppError, UserIdentity};
use baladiya_domain::UserId;
use tower_sessions::Session;

use crate::dto::UserIdentityResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let subject = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.subject().to_owned());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(subject) = subject {
        tracing::info!(subject = subject.as_str(), "signed out");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let user_id = UserId::parse(identity.subject())
        .map_err(|_| AppError::Unauthorized("session identity is not a user id".to_owned()))?;
    let user = state.user_service.find_user(user_id).await?;

    Ok(Json(UserIdentityResponse::from(user)))
}
