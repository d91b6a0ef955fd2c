use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Admin decision on a pending delegation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/delegation-approval-request.ts"
)]
pub struct DelegationApprovalRequest {
    pub delegation_id: String,
    pub approved: bool,
}

/// Acknowledgement of a recorded delegation decision.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/delegation-approval-response.ts"
)]
pub struct DelegationApprovalResponse {
    pub success: bool,
    pub approved: bool,
}

/// Incoming delegation request from the delegator.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-delegation-request.ts"
)]
pub struct CreateDelegationRequest {
    pub delegatee_email: String,
    pub permissions: Vec<String>,
    /// RFC 3339 timestamp. Omit for an open-ended delegation.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Activation toggle for a decided delegation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/set-delegation-active-request.ts"
)]
pub struct SetDelegationActiveRequest {
    pub is_active: bool,
}

/// API representation of a delegation rule.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/delegation-response.ts"
)]
pub struct DelegationResponse {
    pub delegation_id: String,
    pub delegator_email: String,
    pub delegatee_email: String,
    pub delegated_permissions: Vec<String>,
    pub approval_status: String,
    pub is_active: bool,
    pub end_date: Option<String>,
    pub reason: Option<String>,
    pub created_at: String,
    pub decided_by: Option<String>,
    pub decided_at: Option<String>,
}
