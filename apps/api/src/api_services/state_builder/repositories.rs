use std::sync::Arc;

use baladiya_application::{
    AuditLogRepository, AuditRepository, DelegationRepository, GateDecisionRepository,
    RoleRepository, UserRepository,
};
use baladiya_infrastructure::{
    PostgresAuditLogRepository, PostgresAuditRepository, PostgresDelegationRepository,
    PostgresGateDecisionRepository, PostgresRoleRepository, PostgresUserRepository,
};
use sqlx::PgPool;

/// Storage adapters behind every application port.
pub(crate) struct RepositorySet {
    pub(crate) user_repository: Arc<dyn UserRepository>,
    pub(crate) role_repository: Arc<dyn RoleRepository>,
    pub(crate) delegation_repository: Arc<dyn DelegationRepository>,
    pub(crate) audit_repository: Arc<dyn AuditRepository>,
    pub(crate) audit_log_repository: Arc<dyn AuditLogRepository>,
    pub(crate) gate_decision_repository: Arc<dyn GateDecisionRepository>,
}

impl RepositorySet {
    pub(crate) fn postgres(pool: &PgPool) -> Self {
        Self {
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            role_repository: Arc::new(PostgresRoleRepository::new(pool.clone())),
            delegation_repository: Arc::new(PostgresDelegationRepository::new(pool.clone())),
            audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
            audit_log_repository: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
            gate_decision_repository: Arc::new(PostgresGateDecisionRepository::new(pool.clone())),
        }
    }

    #[cfg(test)]
    pub(crate) fn in_memory(store: &Arc<baladiya_infrastructure::InMemorySecurityStore>) -> Self {
        Self {
            user_repository: store.clone(),
            role_repository: store.clone(),
            delegation_repository: store.clone(),
            audit_repository: store.clone(),
            audit_log_repository: store.clone(),
            gate_decision_repository: store.clone(),
        }
    }
}
