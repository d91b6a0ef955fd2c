use serde::Deserialize;
use ts_rs::TS;

/// Operator sign-in with the deployment bootstrap token.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub token: String,
}
