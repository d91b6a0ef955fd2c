use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Role creation or permission replacement.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-role-request.ts"
)]
pub struct SaveRoleRequest {
    pub name: String,
    pub permissions: Vec<String>,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub name: String,
    pub permissions: Vec<String>,
}

/// Secondary role assignment or removal.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-request.ts"
)]
pub struct RoleAssignmentRequest {
    pub user_id: String,
    pub role_name: String,
}

/// API representation of a directory user.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub assigned_roles: Vec<String>,
    pub created_at: String,
}

/// API representation of an audit log entry.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub subject: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
    pub created_at: String,
}
