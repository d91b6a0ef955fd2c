//! Process-local implementation of every security port.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use baladiya_application::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    DelegationQuery, DelegationRepository, DelegationRevision, GateDecisionRecord,
    GateDecisionRepository, RoleRepository, UserListQuery, UserRepository,
};
use baladiya_core::{AppError, AppResult};
use baladiya_domain::{
    ApprovalStatus, DelegationId, DelegationRule, EmailAddress, EntityType, RoleDefinition,
    RoleName, User, UserId,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
struct StoredAuditEvent {
    event_id: Uuid,
    event: AuditEvent,
    created_at: DateTime<Utc>,
}

/// In-memory users, roles, delegations, audit log and gate history.
#[derive(Debug, Default)]
pub struct InMemorySecurityStore {
    users: RwLock<HashMap<UserId, User>>,
    roles: RwLock<BTreeMap<RoleName, RoleDefinition>>,
    delegations: RwLock<HashMap<DelegationId, DelegationRule>>,
    audit_events: RwLock<Vec<StoredAuditEvent>>,
    gate_decisions: RwLock<Vec<GateDecisionRecord>>,
}

impl InMemorySecurityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemorySecurityStore {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn create_user(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.email() == user.email()) {
            return Err(AppError::Conflict(
                "a user with this email already exists".to_owned(),
            ));
        }

        users.insert(user.user_id(), user.clone());
        Ok(())
    }

    async fn add_assigned_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        if !user.assign_role(role_name.clone()) {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' already has role '{role_name}'"
            )));
        }

        Ok(())
    }

    async fn remove_assigned_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        if !user.unassign_role(role_name) {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not have role '{role_name}'"
            )));
        }

        Ok(())
    }

    async fn list_users(&self, query: UserListQuery) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        let mut values = users.values().cloned().collect::<Vec<_>>();
        values.sort_by(|left, right| left.email().cmp(right.email()));

        Ok(values
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

#[async_trait]
impl RoleRepository for InMemorySecurityStore {
    async fn list_roles_by_names(&self, names: &[RoleName]) -> AppResult<Vec<RoleDefinition>> {
        let roles = self.roles.read().await;
        let names = names.iter().collect::<BTreeSet<_>>();

        Ok(names
            .into_iter()
            .filter_map(|name| roles.get(name).cloned())
            .collect())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        Ok(self.roles.read().await.values().cloned().collect())
    }

    async fn find_role(&self, name: &RoleName) -> AppResult<Option<RoleDefinition>> {
        Ok(self.roles.read().await.get(name).cloned())
    }

    async fn save_role(&self, role: &RoleDefinition) -> AppResult<()> {
        self.roles
            .write()
            .await
            .insert(role.name().clone(), role.clone());
        Ok(())
    }
}

#[async_trait]
impl DelegationRepository for InMemorySecurityStore {
    async fn list_active_for_delegatee(
        &self,
        delegatee_email: &EmailAddress,
    ) -> AppResult<Vec<DelegationRule>> {
        Ok(self
            .delegations
            .read()
            .await
            .values()
            .filter(|delegation| {
                delegation.delegatee_email() == delegatee_email
                    && delegation.is_active()
                    && delegation.approval_status() == ApprovalStatus::Approved
            })
            .cloned()
            .collect())
    }

    async fn find_delegation(
        &self,
        delegation_id: DelegationId,
    ) -> AppResult<Option<DelegationRule>> {
        Ok(self.delegations.read().await.get(&delegation_id).cloned())
    }

    async fn create_delegation(&self, delegation: &DelegationRule) -> AppResult<()> {
        let mut delegations = self.delegations.write().await;

        if delegations.contains_key(&delegation.delegation_id()) {
            return Err(AppError::Conflict(format!(
                "delegation '{}' already exists",
                delegation.delegation_id()
            )));
        }

        delegations.insert(delegation.delegation_id(), delegation.clone());
        Ok(())
    }

    async fn update_delegation(
        &self,
        delegation: &DelegationRule,
        expected: DelegationRevision,
    ) -> AppResult<()> {
        let mut delegations = self.delegations.write().await;
        let Some(stored) = delegations.get_mut(&delegation.delegation_id()) else {
            return Err(AppError::NotFound(format!(
                "delegation '{}' does not exist",
                delegation.delegation_id()
            )));
        };

        if !expected.matches(stored) {
            return Err(AppError::Conflict(format!(
                "delegation '{}' was changed by another request",
                delegation.delegation_id()
            )));
        }

        *stored = delegation.clone();
        Ok(())
    }

    async fn list_delegations(&self, query: &DelegationQuery) -> AppResult<Vec<DelegationRule>> {
        let delegations = self.delegations.read().await;
        let mut values = delegations
            .values()
            .filter(|delegation| matches_query(delegation, query))
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by_key(|delegation| std::cmp::Reverse(delegation.created_at()));

        Ok(values
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

fn matches_query(delegation: &DelegationRule, query: &DelegationQuery) -> bool {
    let delegatee_matches = query
        .delegatee_email
        .as_ref()
        .is_none_or(|email| delegation.delegatee_email() == email);
    let delegator_matches = query
        .delegator_email
        .as_ref()
        .is_none_or(|email| delegation.delegator_email() == email);
    let participant_matches = query.participant_email.as_ref().is_none_or(|email| {
        delegation.delegatee_email() == email || delegation.delegator_email() == email
    });
    let status_matches = query
        .approval_status
        .is_none_or(|status| delegation.approval_status() == status);

    delegatee_matches && delegator_matches && participant_matches && status_matches
}

#[async_trait]
impl AuditRepository for InMemorySecurityStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.audit_events.write().await.push(StoredAuditEvent {
            event_id: Uuid::new_v4(),
            event,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for InMemorySecurityStore {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let events = self.audit_events.read().await;

        Ok(events
            .iter()
            .rev()
            .filter(|stored| {
                query
                    .action
                    .as_deref()
                    .is_none_or(|action| stored.event.action.as_str() == action)
                    && query
                        .subject
                        .as_deref()
                        .is_none_or(|subject| stored.event.subject == subject)
            })
            .skip(query.offset)
            .take(query.limit)
            .map(|stored| AuditLogEntry {
                event_id: stored.event_id.to_string(),
                subject: stored.event.subject.clone(),
                action: stored.event.action.as_str().to_owned(),
                resource_type: stored.event.resource_type.clone(),
                resource_id: stored.event.resource_id.clone(),
                detail: stored.event.detail.clone(),
                created_at: stored.created_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl GateDecisionRepository for InMemorySecurityStore {
    async fn append_decision(&self, record: &GateDecisionRecord) -> AppResult<()> {
        self.gate_decisions.write().await.push(record.clone());
        Ok(())
    }

    async fn list_decisions_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Vec<GateDecisionRecord>> {
        Ok(self
            .gate_decisions
            .read()
            .await
            .iter()
            .filter(|record| record.entity_type == entity_type && record.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
