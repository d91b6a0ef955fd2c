use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use baladiya_application::{AuditLogQuery, SaveRoleInput, UserListQuery};
use baladiya_core::UserIdentity;
use baladiya_domain::UserId;
use serde::Deserialize;

use crate::dto::{
    AuditLogEntryResponse, RoleAssignmentRequest, RoleResponse, SaveRoleRequest, UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub action: Option<String>,
    pub subject: Option<String>,
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .security_admin_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn save_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .security_admin_service
        .save_role(
            &user,
            SaveRoleInput {
                name: payload.name,
                permissions: payload.permissions,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .security_admin_service
        .list_users(
            &user,
            UserListQuery {
                limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                offset: query.offset.unwrap_or_default(),
            },
        )
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RoleAssignmentRequest>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::parse(&payload.user_id)?;
    state
        .security_admin_service
        .assign_role(&user, user_id, &payload.role_name)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RoleAssignmentRequest>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::parse(&payload.user_id)?;
    state
        .security_admin_service
        .unassign_role(&user, user_id, &payload.role_name)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AuditLogListQuery>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let entries = state
        .security_admin_service
        .list_audit_log(
            &user,
            AuditLogQuery {
                limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                offset: query.offset.unwrap_or_default(),
                action: query.action,
                subject: query.subject,
            },
        )
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
