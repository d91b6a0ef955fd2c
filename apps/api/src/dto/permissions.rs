use baladiya_application::PermissionResolution;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Permission check for the caller or, for admins, another user.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-request.ts"
)]
pub struct PermissionCheckRequest {
    pub permission: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Outcome of a permission check.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub has_permission: bool,
    /// One of `admin`, `role`, `delegation` or `none`.
    pub source: String,
    pub roles: Vec<String>,
}

impl From<PermissionResolution> for PermissionCheckResponse {
    fn from(value: PermissionResolution) -> Self {
        Self {
            has_permission: value.allowed,
            source: value.source.as_str().to_owned(),
            roles: value.roles,
        }
    }
}
