//! Recording decisions on approval gates.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use baladiya_core::{AppError, AppResult, UserIdentity};
use baladiya_domain::{AuditAction, EntityType, GateConfig, GateRegistry};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, GateDecisionRecord, GateDecisionRepository,
};

/// Input for one gate decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitGateDecisionInput {
    /// Transport value of the gated entity type.
    pub entity_type: String,
    /// Gate name.
    pub gate_name: String,
    /// Identifier of the gated entity.
    pub entity_id: String,
    /// Chosen decision option.
    pub decision: String,
    /// Optional reviewer comment.
    pub comment: Option<String>,
}

/// Application service for gate decisions.
#[derive(Clone)]
pub struct GateService {
    authorization_service: AuthorizationService,
    registry: Arc<GateRegistry>,
    decision_repository: Arc<dyn GateDecisionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl GateService {
    /// Creates the gate service over a validated registry.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        registry: GateRegistry,
        decision_repository: Arc<dyn GateDecisionRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            registry: Arc::new(registry),
            decision_repository,
            audit_repository,
        }
    }

    /// Returns every configured gate.
    #[must_use]
    pub fn list_gates(&self) -> Vec<GateConfig> {
        self.registry.iter().cloned().collect()
    }

    /// Validates and records a decision.
    ///
    /// The decision is checked against the gate's options before the caller's
    /// role, and nothing is written unless both checks pass.
    pub async fn submit_decision(
        &self,
        actor: &UserIdentity,
        input: SubmitGateDecisionInput,
    ) -> AppResult<GateDecisionRecord> {
        let entity_type = input.entity_type.parse::<EntityType>()?;
        let entity_id = input.entity_id.trim();
        if entity_id.is_empty() {
            return Err(AppError::Validation("entity_id must not be empty".to_owned()));
        }

        let gate = self
            .registry
            .find(entity_type, input.gate_name.as_str())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "gate '{}' does not exist for '{}'",
                    input.gate_name,
                    entity_type.as_str()
                ))
            })?;
        let option = gate.validate_decision(input.decision.as_str())?;

        let access = self.authorization_service.subject_access(actor).await?;
        if !access.has_role(gate.required_role()) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' needs role '{}' to decide gate '{}'",
                actor.subject(),
                gate.required_role(),
                gate.gate_name()
            )));
        }

        let record = GateDecisionRecord {
            decision_id: Uuid::new_v4(),
            entity_type,
            gate_name: gate.gate_name().to_owned(),
            entity_id: entity_id.to_owned(),
            decision: option.decision.clone(),
            decided_by: actor.subject().to_owned(),
            comment: input
                .comment
                .map(|comment| comment.trim().to_owned())
                .filter(|comment| !comment.is_empty()),
            from_stage: gate.stage_transition().from.clone(),
            to_stage: gate.resulting_stage(option).to_owned(),
            auto_actions: gate.auto_actions_for(option.decision.as_str()).to_vec(),
            decided_at: Utc::now(),
        };

        self.decision_repository.append_decision(&record).await?;
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::GateDecisionRecorded,
                resource_type: format!("gate:{}", entity_type.as_str()),
                resource_id: record.entity_id.clone(),
                detail: Some(format!(
                    "{} '{}' at gate '{}' ({} -> {})",
                    record.decision,
                    record.entity_id,
                    record.gate_name,
                    record.from_stage,
                    record.to_stage
                )),
            })
            .await?;

        tracing::info!(
            entity_type = entity_type.as_str(),
            entity_id = %record.entity_id,
            gate = %record.gate_name,
            decision = %record.decision,
            "gate decision recorded"
        );

        Ok(record)
    }

    /// Lists decisions recorded for one entity.
    pub async fn list_decisions(
        &self,
        actor: &UserIdentity,
        entity_type: &str,
        entity_id: &str,
    ) -> AppResult<Vec<GateDecisionRecord>> {
        let entity_type = entity_type.parse::<EntityType>()?;
        self.authorization_service.subject_access(actor).await?;

        self.decision_repository
            .list_decisions_for_entity(entity_type, entity_id)
            .await
    }
}
