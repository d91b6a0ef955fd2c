use baladiya_core::{AppError, AppResult, UserIdentity};
use baladiya_domain::{AuditAction, DelegationRule, EmailAddress, Permission};

use crate::{AuditEvent, DelegationQuery};

use super::{DelegationService, RequestDelegationInput};

const MAX_LIST_LIMIT: usize = 200;

impl DelegationService {
    /// Records a pending delegation from the caller to another user.
    ///
    /// The caller must hold every delegated permission through the admin
    /// role or an assigned role. Permissions received by delegation cannot
    /// be passed on.
    pub async fn request_delegation(
        &self,
        actor: &UserIdentity,
        input: RequestDelegationInput,
    ) -> AppResult<DelegationRule> {
        if self.policy.require_end_date && input.end_date.is_none() {
            return Err(AppError::Validation(
                "delegation end_date is required".to_owned(),
            ));
        }

        let delegatee_email = EmailAddress::new(input.delegatee_email)?;
        let permissions = Permission::parse_set(input.permissions)?;
        let access = self.authorization_service.subject_access(actor).await?;

        let delegation = DelegationRule::request(
            access.user.email().clone(),
            delegatee_email,
            permissions,
            input.end_date,
            input.reason,
            chrono::Utc::now(),
        )?;

        if self
            .user_repository
            .find_by_email(delegation.delegatee_email())
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "delegatee '{}' does not exist",
                delegation.delegatee_email()
            )));
        }

        for permission in delegation.delegated_permissions() {
            if !self
                .authorization_service
                .held_directly(&access.user, permission)
                .await?
            {
                return Err(AppError::Forbidden(format!(
                    "subject '{}' cannot delegate '{permission}' without holding it directly",
                    actor.subject()
                )));
            }
        }

        self.delegation_repository
            .create_delegation(&delegation)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::DelegationRequested,
                resource_type: "delegation_rule".to_owned(),
                resource_id: delegation.delegation_id().to_string(),
                detail: Some(format!(
                    "requested delegation of [{}] to '{}'",
                    permission_list(&delegation),
                    delegation.delegatee_email()
                )),
            })
            .await?;

        tracing::info!(
            delegation_id = %delegation.delegation_id(),
            delegator = %delegation.delegator_email(),
            delegatee = %delegation.delegatee_email(),
            "delegation requested"
        );

        Ok(delegation)
    }

    /// Lists delegations. Non-admin callers only see rules they take part in.
    pub async fn list_delegations(
        &self,
        actor: &UserIdentity,
        mut query: DelegationQuery,
    ) -> AppResult<Vec<DelegationRule>> {
        let access = self.authorization_service.subject_access(actor).await?;

        if !access.is_admin {
            query.participant_email = Some(access.user.email().clone());
        }
        query.limit = query.limit.clamp(1, MAX_LIST_LIMIT);

        self.delegation_repository.list_delegations(&query).await
    }
}

pub(super) fn permission_list(delegation: &DelegationRule) -> String {
    delegation
        .delegated_permissions()
        .iter()
        .map(Permission::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
