use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use baladiya_core::AppResult;
use baladiya_domain::{AutoAction, EntityType};

/// Recorded outcome of one gate decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecisionRecord {
    /// Stable record identifier.
    pub decision_id: Uuid,
    /// Gated entity type.
    pub entity_type: EntityType,
    /// Gate name.
    pub gate_name: String,
    /// Identifier of the gated entity.
    pub entity_id: String,
    /// Chosen decision option.
    pub decision: String,
    /// Subject that decided.
    pub decided_by: String,
    /// Optional reviewer comment.
    pub comment: Option<String>,
    /// Stage before the decision.
    pub from_stage: String,
    /// Stage after the decision.
    pub to_stage: String,
    /// Side effects the caller should enqueue.
    pub auto_actions: Vec<AutoAction>,
    /// Decision timestamp.
    pub decided_at: DateTime<Utc>,
}

/// Append-only history of gate decisions.
#[async_trait]
pub trait GateDecisionRepository: Send + Sync {
    /// Persists one decision.
    async fn append_decision(&self, record: &GateDecisionRecord) -> AppResult<()>;

    /// Lists decisions for one entity, oldest first.
    async fn list_decisions_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Vec<GateDecisionRecord>>;
}
