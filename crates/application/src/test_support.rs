use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use baladiya_core::{AppError, AppResult, UserIdentity};
use baladiya_domain::{
    ApprovalStatus, AuditAction, DelegationId, DelegationRule, DelegationRuleParts, EmailAddress,
    EntityType, Permission, RoleDefinition, RoleName, User, UserId,
};

use crate::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    AuthorizationService, DelegationQuery, DelegationRepository, DelegationRevision, EmailService,
    GateDecisionRecord, GateDecisionRepository, RoleRepository, UserListQuery, UserRepository,
};

#[derive(Default)]
pub(crate) struct FakeSecurityStore {
    users: Mutex<Vec<User>>,
    roles: Mutex<BTreeMap<RoleName, RoleDefinition>>,
    delegations: Mutex<Vec<DelegationRule>>,
    audit_events: Mutex<Vec<AuditEvent>>,
    gate_decisions: Mutex<Vec<GateDecisionRecord>>,
    fail_reads: AtomicBool,
}

impl FakeSecurityStore {
    pub(crate) async fn insert_user(&self, user: User) {
        self.users.lock().await.push(user);
    }

    pub(crate) async fn insert_role(&self, role: RoleDefinition) {
        self.roles.lock().await.insert(role.name().clone(), role);
    }

    pub(crate) async fn insert_delegation(&self, delegation: DelegationRule) {
        self.delegations.lock().await.push(delegation);
    }

    pub(crate) async fn delegation(&self, delegation_id: DelegationId) -> Option<DelegationRule> {
        self.delegations
            .lock()
            .await
            .iter()
            .find(|delegation| delegation.delegation_id() == delegation_id)
            .cloned()
    }

    pub(crate) async fn audit_actions(&self) -> Vec<AuditAction> {
        self.audit_events
            .lock()
            .await
            .iter()
            .map(|event| event.action)
            .collect()
    }

    pub(crate) fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    fn check_reads(&self) -> AppResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::StoreRead("connection refused".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FakeSecurityStore {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        self.check_reads()?;
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.user_id() == user_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        self.check_reads()?;
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn create_user(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.lock().await;
        if users.iter().any(|existing| existing.email() == user.email()) {
            return Err(AppError::Conflict(format!("user '{}' exists", user.email())));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn add_assigned_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.user_id() == user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))?;
        if !user.assign_role(role_name.clone()) {
            return Err(AppError::Conflict(format!("user '{user_id}' has '{role_name}'")));
        }
        Ok(())
    }

    async fn remove_assigned_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.user_id() == user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))?;
        if !user.unassign_role(role_name) {
            return Err(AppError::NotFound(format!("user '{user_id}' lacks '{role_name}'")));
        }
        Ok(())
    }

    async fn list_users(&self, query: UserListQuery) -> AppResult<Vec<User>> {
        self.check_reads()?;
        let mut users = self.users.lock().await.clone();
        users.sort_by(|left, right| left.email().cmp(right.email()));
        Ok(users
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

#[async_trait]
impl RoleRepository for FakeSecurityStore {
    async fn list_roles_by_names(&self, names: &[RoleName]) -> AppResult<Vec<RoleDefinition>> {
        self.check_reads()?;
        let roles = self.roles.lock().await;
        Ok(names
            .iter()
            .filter_map(|name| roles.get(name).cloned())
            .collect())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        self.check_reads()?;
        Ok(self.roles.lock().await.values().cloned().collect())
    }

    async fn find_role(&self, name: &RoleName) -> AppResult<Option<RoleDefinition>> {
        self.check_reads()?;
        Ok(self.roles.lock().await.get(name).cloned())
    }

    async fn save_role(&self, role: &RoleDefinition) -> AppResult<()> {
        self.insert_role(role.clone()).await;
        Ok(())
    }
}

#[async_trait]
impl DelegationRepository for FakeSecurityStore {
    async fn list_active_for_delegatee(
        &self,
        delegatee_email: &EmailAddress,
    ) -> AppResult<Vec<DelegationRule>> {
        self.check_reads()?;
        Ok(self
            .delegations
            .lock()
            .await
            .iter()
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
        self.check_reads()?;
        Ok(self.delegation(delegation_id).await)
    }

    async fn create_delegation(&self, delegation: &DelegationRule) -> AppResult<()> {
        self.insert_delegation(delegation.clone()).await;
        Ok(())
    }

    async fn update_delegation(
        &self,
        delegation: &DelegationRule,
        expected: DelegationRevision,
    ) -> AppResult<()> {
        let mut delegations = self.delegations.lock().await;
        let stored = delegations
            .iter_mut()
            .find(|stored| stored.delegation_id() == delegation.delegation_id())
            .ok_or_else(|| {
                AppError::NotFound(format!("delegation '{}'", delegation.delegation_id()))
            })?;
        if !expected.matches(stored) {
            return Err(AppError::Conflict(format!(
                "delegation '{}' changed concurrently",
                delegation.delegation_id()
            )));
        }
        *stored = delegation.clone();
        Ok(())
    }

    async fn list_delegations(&self, query: &DelegationQuery) -> AppResult<Vec<DelegationRule>> {
        self.check_reads()?;
        Ok(self
            .delegations
            .lock()
            .await
            .iter()
            .filter(|delegation| {
                query
                    .delegatee_email
                    .as_ref()
                    .is_none_or(|email| delegation.delegatee_email() == email)
                    && query
                        .delegator_email
                        .as_ref()
                        .is_none_or(|email| delegation.delegator_email() == email)
                    && query.participant_email.as_ref().is_none_or(|email| {
                        delegation.delegatee_email() == email
                            || delegation.delegator_email() == email
                    })
                    && query
                        .approval_status
                        .is_none_or(|status| delegation.approval_status() == status)
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditRepository for FakeSecurityStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.audit_events.lock().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for FakeSecurityStore {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        self.check_reads()?;
        Ok(self
            .audit_events
            .lock()
            .await
            .iter()
            .rev()
            .enumerate()
            .filter(|(_, event)| {
                query
                    .action
                    .as_deref()
                    .is_none_or(|action| event.action.as_str() == action)
                    && query
                        .subject
                        .as_deref()
                        .is_none_or(|subject| event.subject == subject)
            })
            .skip(query.offset)
            .take(query.limit)
            .map(|(index, event)| AuditLogEntry {
                event_id: index.to_string(),
                subject: event.subject.clone(),
                action: event.action.as_str().to_owned(),
                resource_type: event.resource_type.clone(),
                resource_id: event.resource_id.clone(),
                detail: event.detail.clone(),
                created_at: Utc::now().to_rfc3339(),
            })
            .collect())
    }
}

#[async_trait]
impl GateDecisionRepository for FakeSecurityStore {
    async fn append_decision(&self, record: &GateDecisionRecord) -> AppResult<()> {
        self.gate_decisions.lock().await.push(record.clone());
        Ok(())
    }

    async fn list_decisions_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Vec<GateDecisionRecord>> {
        self.check_reads()?;
        Ok(self
            .gate_decisions
            .lock()
            .await
            .iter()
            .filter(|record| record.entity_type == entity_type && record.entity_id == entity_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeEmailService {
    pub(crate) sent_to: Mutex<Vec<String>>,
    pub(crate) fail: bool,
}

#[async_trait]
impl EmailService for FakeEmailService {
    async fn send_email(
        &self,
        to: &str,
        _subject: &str,
        _text_body: &str,
        _html_body: Option<&str>,
    ) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Internal("smtp relay unavailable".to_owned()));
        }
        self.sent_to.lock().await.push(to.to_owned());
        Ok(())
    }
}

pub(crate) fn authorization_service(store: &Arc<FakeSecurityStore>) -> AuthorizationService {
    AuthorizationService::new(store.clone(), store.clone(), store.clone())
}

pub(crate) fn role_name(value: &str) -> RoleName {
    RoleName::new(value).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn permission(value: &str) -> Permission {
    Permission::new(value).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn email(value: &str) -> EmailAddress {
    EmailAddress::new(value).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn user(address: &str, role: &str, assigned_roles: &[&str]) -> User {
    User::new(
        UserId::new(),
        email(address),
        address,
        role_name(role),
        assigned_roles.iter().map(|name| role_name(name)).collect(),
        Utc::now(),
    )
}

pub(crate) fn role(name: &str, permissions: &[&str]) -> RoleDefinition {
    RoleDefinition::new(
        role_name(name),
        permissions.iter().map(|value| permission(value)).collect(),
    )
}

pub(crate) fn identity(user: &User) -> UserIdentity {
    UserIdentity::new(
        user.user_id().to_string(),
        user.display_name(),
        user.email().as_str(),
    )
}

pub(crate) fn delegation(
    delegator: &User,
    delegatee: &User,
    permissions: &[&str],
    approval_status: ApprovalStatus,
    is_active: bool,
    end_in_days: Option<i64>,
) -> DelegationRule {
    DelegationRule::from_parts(DelegationRuleParts {
        delegation_id: DelegationId::new(),
        delegator_email: delegator.email().clone(),
        delegatee_email: delegatee.email().clone(),
        delegated_permissions: permissions.iter().map(|value| permission(value)).collect(),
        approval_status,
        is_active,
        end_date: end_in_days.map(|days| Utc::now() + Duration::days(days)),
        reason: None,
        created_at: Utc::now() - Duration::days(7),
        decided_by: None,
        decided_at: None,
    })
}
