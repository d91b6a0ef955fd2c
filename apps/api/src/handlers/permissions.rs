use axum::Json;
use axum::extract::{Extension, State};
use baladiya_core::UserIdentity;
use baladiya_domain::{Permission, UserId};

use crate::dto::{PermissionCheckRequest, PermissionCheckResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves one permission for the caller, or for `userId` when the caller is admin.
pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<PermissionCheckRequest>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let permission = Permission::new(payload.permission)?;
    let target_user_id = payload
        .user_id
        .as_deref()
        .map(UserId::parse)
        .transpose()?;

    let resolution = state
        .authorization_service
        .resolve(Some(&user), &permission, target_user_id)
        .await?;

    Ok(Json(PermissionCheckResponse::from(resolution)))
}
