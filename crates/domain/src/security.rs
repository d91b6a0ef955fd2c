use std::collections::BTreeSet;
use std::str::FromStr;

use baladiya_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Primary role name that bypasses every permission check.
pub const ADMIN_ROLE: &str = "admin";

/// Primary role given to newly provisioned users.
pub const DEFAULT_USER_ROLE: &str = "user";

/// Opaque permission identifier, matched by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(NonEmptyString);

impl Permission {
    /// Creates a validated permission identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| AppError::Validation("permission must not be empty".to_owned()))
    }

    /// Returns the stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Parses a list of transport values into a de-duplicated permission set.
    pub fn parse_set<I, S>(values: I) -> AppResult<BTreeSet<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().map(Self::new).collect()
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Unique role name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(NonEmptyString);

impl RoleName {
    /// Creates a validated role name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| AppError::Validation("role name must not be empty".to_owned()))
    }

    /// Returns whether this is the built-in administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.as_str() == ADMIN_ROLE
    }

    /// Returns the role name as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    name: RoleName,
    permissions: BTreeSet<Permission>,
}

impl RoleDefinition {
    /// Creates a role definition.
    #[must_use]
    pub fn new(name: RoleName, permissions: BTreeSet<Permission>) -> Self {
        Self { name, permissions }
    }

    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Returns the permissions granted by this role.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// Returns whether this role grants the permission.
    #[must_use]
    pub fn grants(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }
}

/// Source that produced a permission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    /// Primary role is admin.
    Admin,
    /// One of the assigned roles grants the permission.
    Role,
    /// An approved, active, unexpired delegation grants the permission.
    Delegation,
    /// Nothing grants the permission.
    None,
}

impl PermissionSource {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Role => "role",
            Self::Delegation => "delegation",
            Self::None => "none",
        }
    }
}

impl FromStr for PermissionSource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "role" => Ok(Self::Role),
            "delegation" => Ok(Self::Delegation),
            "none" => Ok(Self::None),
            _ => Err(AppError::Validation(format!(
                "unknown permission source '{value}'"
            ))),
        }
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created or its permissions replaced.
    SecurityRoleSaved,
    /// Emitted when a role is assigned to a user.
    SecurityRoleAssigned,
    /// Emitted when a role is removed from a user.
    SecurityRoleUnassigned,
    /// Emitted when a delegator requests a delegation.
    DelegationRequested,
    /// Emitted when an admin approves a delegation.
    DelegationApproved,
    /// Emitted when an admin rejects a delegation.
    DelegationRejected,
    /// Emitted when an admin re-activates an approved delegation.
    DelegationActivated,
    /// Emitted when an admin deactivates a delegation.
    DelegationDeactivated,
    /// Emitted when a gate decision is recorded.
    GateDecisionRecorded,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleSaved => "security.role.saved",
            Self::SecurityRoleAssigned => "security.role.assigned",
            Self::SecurityRoleUnassigned => "security.role.unassigned",
            Self::DelegationRequested => "delegation.requested",
            Self::DelegationApproved => "delegation.approved",
            Self::DelegationRejected => "delegation.rejected",
            Self::DelegationActivated => "delegation.activated",
            Self::DelegationDeactivated => "delegation.deactivated",
            Self::GateDecisionRecorded => "gate.decision.recorded",
        }
    }
}
