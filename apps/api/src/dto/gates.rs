use baladiya_application::GateDecisionRecord;
use baladiya_domain::{AutoAction, GateConfig};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of a configured gate.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/gate-response.ts"
)]
pub struct GateResponse {
    pub entity_type: String,
    pub gate_name: String,
    pub required_role: String,
    pub from_stage: String,
    pub to_stage: String,
    pub decision_options: Vec<GateDecisionOptionResponse>,
}

/// One allowed decision and the automation it triggers.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/gate-decision-option-response.ts"
)]
pub struct GateDecisionOptionResponse {
    pub decision: String,
    pub advances_stage: bool,
    pub auto_actions: Vec<String>,
}

/// Incoming gate decision.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submit-gate-decision-request.ts"
)]
pub struct SubmitGateDecisionRequest {
    pub entity_type: String,
    pub gate_name: String,
    pub entity_id: String,
    pub decision: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// API representation of a recorded gate decision.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/gate-decision-response.ts"
)]
pub struct GateDecisionResponse {
    pub decision_id: String,
    pub entity_type: String,
    pub gate_name: String,
    pub entity_id: String,
    pub decision: String,
    pub decided_by: String,
    pub comment: Option<String>,
    pub from_stage: String,
    pub to_stage: String,
    pub auto_actions: Vec<String>,
    pub decided_at: String,
}

fn action_names(actions: &[AutoAction]) -> Vec<String> {
    actions
        .iter()
        .map(|action| action.as_str().to_owned())
        .collect()
}

impl From<GateConfig> for GateResponse {
    fn from(value: GateConfig) -> Self {
        let decision_options = value
            .decision_options()
            .iter()
            .map(|option| GateDecisionOptionResponse {
                decision: option.decision.clone(),
                advances_stage: option.advances_stage,
                auto_actions: action_names(value.auto_actions_for(&option.decision)),
            })
            .collect();

        Self {
            entity_type: value.entity_type().as_str().to_owned(),
            gate_name: value.gate_name().to_owned(),
            required_role: value.required_role().as_str().to_owned(),
            from_stage: value.stage_transition().from.clone(),
            to_stage: value.stage_transition().to.clone(),
            decision_options,
        }
    }
}

impl From<GateDecisionRecord> for GateDecisionResponse {
    fn from(value: GateDecisionRecord) -> Self {
        Self {
            decision_id: value.decision_id.to_string(),
            entity_type: value.entity_type.as_str().to_owned(),
            gate_name: value.gate_name,
            entity_id: value.entity_id,
            decision: value.decision,
            decided_by: value.decided_by,
            comment: value.comment,
            from_stage: value.from_stage,
            to_stage: value.to_stage,
            auto_actions: action_names(&value.auto_actions),
            decided_at: value.decided_at.to_rfc3339(),
        }
    }
}
