use std::sync::Arc;

use crate::{
    AuditLogRepository, AuditRepository, AuthorizationService, RoleRepository, UserRepository,
};

mod roles;
mod users;


/// Input for creating a role or replacing its permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRoleInput {
    /// Role name.
    pub name: String,
    /// Complete permission set of the role.
    pub permissions: Vec<String>,
}

/// Application service for administrator-only security management.
#[derive(Clone)]
pub struct SecurityAdminService {
    authorization_service: AuthorizationService,
    user_repository: Arc<dyn UserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
}

impl SecurityAdminService {
    /// Creates a security admin service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        user_repository: Arc<dyn UserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        audit_log_repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            authorization_service,
            user_repository,
            role_repository,
            audit_repository,
            audit_log_repository,
        }
    }
}
