use axum::Json;
use axum::extract::{Extension, State};
use baladiya_application::FilterEntityPayloadInput;
use baladiya_core::UserIdentity;

use crate::dto::{FieldSecurityFilterRequest, FieldSecurityFilterResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn filter_fields_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<FieldSecurityFilterRequest>,
) -> ApiResult<Json<FieldSecurityFilterResponse>> {
    let outcome = state
        .field_security_service
        .filter_entity_payload(
            &user,
            FilterEntityPayloadInput {
                entity_type: payload.entity_type,
                fields: payload.fields,
                data: payload.data,
            },
        )
        .await?;

    Ok(Json(FieldSecurityFilterResponse::from(outcome)))
}
