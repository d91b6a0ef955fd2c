use baladiya_domain::FieldFilterOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Entity payload to be filtered for the caller.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-security-filter-request.ts"
)]
pub struct FieldSecurityFilterRequest {
    pub entity_type: String,
    /// Restricts the response to these fields when non-empty.
    #[serde(default)]
    pub fields: Vec<String>,
    #[ts(type = "Record<string, unknown>")]
    pub data: Value,
}

/// Payload with restricted fields removed.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-security-filter-response.ts"
)]
pub struct FieldSecurityFilterResponse {
    #[ts(type = "Record<string, unknown>")]
    pub filtered_data: Value,
    pub masked_fields: Vec<String>,
}

impl From<FieldFilterOutcome> for FieldSecurityFilterResponse {
    fn from(value: FieldFilterOutcome) -> Self {
        Self {
            filtered_data: Value::Object(value.filtered),
            masked_fields: value.masked_fields,
        }
    }
}
