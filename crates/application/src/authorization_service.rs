//! Permission resolver and the guards built on it.
//!
//! The resolver is the only place that knows about the admin bypass. Every
//! call reads the stores, so role and delegation changes apply to the next
//! check.

use std::collections::BTreeSet;
use std::sync::Arc;

use baladiya_domain::{DelegationId, PermissionSource, RoleName, User};

use crate::{DelegationRepository, RoleRepository, UserRepository};

mod guards;
mod resolution;


/// Outcome of one permission check. A denial is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionResolution {
    /// Whether the permission is granted.
    pub allowed: bool,
    /// What produced the grant, or `None` when denied.
    pub source: PermissionSource,
    /// Primary role followed by secondary roles of the checked user.
    pub roles: Vec<String>,
    /// Delegation that produced the grant, when the source is a delegation.
    pub delegation_id: Option<DelegationId>,
}

impl PermissionResolution {
    fn denied(roles: Vec<String>) -> Self {
        Self {
            allowed: false,
            source: PermissionSource::None,
            roles,
            delegation_id: None,
        }
    }

    fn granted(source: PermissionSource, roles: Vec<String>) -> Self {
        Self {
            allowed: true,
            source,
            roles,
            delegation_id: None,
        }
    }
}

/// Resolved directory user with the facts needed for role-gated checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAccess {
    /// Directory record of the caller.
    pub user: User,
    /// Whether the primary role is admin.
    pub is_admin: bool,
    /// Primary and secondary roles.
    pub roles: BTreeSet<RoleName>,
}

/// Application service resolving permissions for directory users.
#[derive(Clone)]
pub struct AuthorizationService {
    user_repository: Arc<dyn UserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    delegation_repository: Arc<dyn DelegationRepository>,
}

impl AuthorizationService {
    /// Creates a resolver over the user, role and delegation stores.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        delegation_repository: Arc<dyn DelegationRepository>,
    ) -> Self {
        Self {
            user_repository,
            role_repository,
            delegation_repository,
        }
    }
}
