use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use baladiya_application::{DelegationQuery, RequestDelegationInput};
use baladiya_core::{AppError, UserIdentity};
use baladiya_domain::{ApprovalStatus, DelegationId, EmailAddress};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::dto::{
    CreateDelegationRequest, DelegationApprovalRequest, DelegationApprovalResponse,
    DelegationResponse, SetDelegationActiveRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationListQuery {
    pub status: Option<String>,
    pub delegator_email: Option<String>,
    pub delegatee_email: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn approve_delegation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<DelegationApprovalRequest>,
) -> ApiResult<Json<DelegationApprovalResponse>> {
    let delegation_id = DelegationId::parse(&payload.delegation_id)?;
    let outcome = state
        .delegation_service
        .decide_delegation(&user, delegation_id, payload.approved)
        .await?;

    Ok(Json(DelegationApprovalResponse::from(outcome)))
}

pub async fn create_delegation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateDelegationRequest>,
) -> ApiResult<(StatusCode, Json<DelegationResponse>)> {
    let end_date = payload.end_date.as_deref().map(parse_end_date).transpose()?;

    let delegation = state
        .delegation_service
        .request_delegation(
            &user,
            RequestDelegationInput {
                delegatee_email: payload.delegatee_email,
                permissions: payload.permissions,
                end_date,
                reason: payload.reason,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DelegationResponse::from(delegation))))
}

pub async fn list_delegations_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<DelegationListQuery>,
) -> ApiResult<Json<Vec<DelegationResponse>>> {
    let query = DelegationQuery {
        delegatee_email: query.delegatee_email.map(EmailAddress::new).transpose()?,
        delegator_email: query.delegator_email.map(EmailAddress::new).transpose()?,
        participant_email: None,
        approval_status: query
            .status
            .as_deref()
            .map(ApprovalStatus::from_str)
            .transpose()?,
        limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        offset: query.offset.unwrap_or_default(),
    };

    let delegations = state
        .delegation_service
        .list_delegations(&user, query)
        .await?
        .into_iter()
        .map(DelegationResponse::from)
        .collect();

    Ok(Json(delegations))
}

pub async fn set_delegation_active_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(delegation_id): Path<String>,
    Json(payload): Json<SetDelegationActiveRequest>,
) -> ApiResult<Json<DelegationResponse>> {
    let delegation_id = DelegationId::parse(&delegation_id)?;
    let delegation = state
        .delegation_service
        .set_delegation_active(&user, delegation_id, payload.is_active)
        .await?;

    Ok(Json(DelegationResponse::from(delegation)))
}

fn parse_end_date(value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|end_date| end_date.with_timezone(&Utc))
        .map_err(|error| AppError::Validation(format!("invalid endDate '{value}': {error}")))
}
