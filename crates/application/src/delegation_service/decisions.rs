use baladiya_core::{AppError, AppResult, UserIdentity};
use baladiya_domain::{AuditAction, DelegationId, DelegationRule};

use crate::{AuditEvent, DelegationRevision};

use super::{DelegationDecisionOutcome, DelegationService};

impl DelegationService {
    /// Approves or rejects a pending delegation.
    ///
    /// Approval activates the rule and notifies both parties. Notification
    /// failures are logged and do not undo the decision.
    pub async fn decide_delegation(
        &self,
        actor: &UserIdentity,
        delegation_id: DelegationId,
        approved: bool,
    ) -> AppResult<DelegationDecisionOutcome> {
        self.authorization_service.require_admin(actor).await?;

        let mut delegation = self.find_delegation(delegation_id).await?;
        let expected = DelegationRevision::of(&delegation);
        delegation.decide(approved, actor.subject(), chrono::Utc::now())?;

        self.delegation_repository
            .update_delegation(&delegation, expected)
            .await?;

        let action = if approved {
            AuditAction::DelegationApproved
        } else {
            AuditAction::DelegationRejected
        };
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action,
                resource_type: "delegation_rule".to_owned(),
                resource_id: delegation_id.to_string(),
                detail: Some(format!(
                    "{} delegation from '{}' to '{}'",
                    delegation.approval_status().as_str(),
                    delegation.delegator_email(),
                    delegation.delegatee_email()
                )),
            })
            .await?;

        tracing::info!(
            delegation_id = %delegation_id,
            status = delegation.approval_status().as_str(),
            decided_by = actor.subject(),
            "delegation decided"
        );

        if approved {
            self.notify_approval(&delegation).await;
        }

        Ok(DelegationDecisionOutcome {
            delegation,
            approved,
        })
    }

    /// Activates or deactivates a decided delegation.
    pub async fn set_delegation_active(
        &self,
        actor: &UserIdentity,
        delegation_id: DelegationId,
        is_active: bool,
    ) -> AppResult<DelegationRule> {
        self.authorization_service.require_admin(actor).await?;

        let mut delegation = self.find_delegation(delegation_id).await?;
        let expected = DelegationRevision::of(&delegation);
        delegation.set_active(is_active)?;

        self.delegation_repository
            .update_delegation(&delegation, expected)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: if is_active {
                    AuditAction::DelegationActivated
                } else {
                    AuditAction::DelegationDeactivated
                },
                resource_type: "delegation_rule".to_owned(),
                resource_id: delegation_id.to_string(),
                detail: None,
            })
            .await?;

        tracing::info!(
            delegation_id = %delegation_id,
            is_active,
            "delegation activation changed"
        );

        Ok(delegation)
    }

    async fn find_delegation(&self, delegation_id: DelegationId) -> AppResult<DelegationRule> {
        self.delegation_repository
            .find_delegation(delegation_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("delegation '{delegation_id}' does not exist"))
            })
    }
}
