use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use baladiya_application::SubmitGateDecisionInput;
use baladiya_core::UserIdentity;

use crate::dto::{GateDecisionResponse, GateResponse, SubmitGateDecisionRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_gates_handler(State(state): State<AppState>) -> Json<Vec<GateResponse>> {
    Json(
        state
            .gate_service
            .list_gates()
            .into_iter()
            .map(GateResponse::from)
            .collect(),
    )
}

pub async fn submit_gate_decision_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SubmitGateDecisionRequest>,
) -> ApiResult<(StatusCode, Json<GateDecisionResponse>)> {
    let record = state
        .gate_service
        .submit_decision(
            &user,
            SubmitGateDecisionInput {
                entity_type: payload.entity_type,
                gate_name: payload.gate_name,
                entity_id: payload.entity_id,
                decision: payload.decision,
                comment: payload.comment,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(GateDecisionResponse::from(record))))
}

pub async fn list_gate_decisions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<GateDecisionResponse>>> {
    let decisions = state
        .gate_service
        .list_decisions(&user, &entity_type, &entity_id)
        .await?
        .into_iter()
        .map(GateDecisionResponse::from)
        .collect();

    Ok(Json(decisions))
}
