//! Time-bounded permission delegations and their approval lifecycle.

use std::collections::BTreeSet;
use std::str::FromStr;

use baladiya_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::security::Permission;
use crate::user::EmailAddress;

/// Unique identifier for a delegation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelegationId(Uuid);

impl DelegationId {
    /// Creates a random delegation identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a delegation identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport value into a delegation identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| AppError::Validation(format!("invalid delegation id '{value}'")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DelegationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DelegationId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Approval dimension of a delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved by an admin. Terminal.
    Approved,
    /// Rejected by an admin. Terminal.
    Rejected,
}

impl ApprovalStatus {
    /// Returns the storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns the status reached by an admin decision.
    ///
    /// Only `pending` can be decided.
    pub fn decide(self, approved: bool) -> AppResult<Self> {
        match self {
            Self::Pending if approved => Ok(Self::Approved),
            Self::Pending => Ok(Self::Rejected),
            Self::Approved | Self::Rejected => Err(AppError::Conflict(format!(
                "delegation was already {}",
                self.as_str()
            ))),
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown approval status '{value}'"
            ))),
        }
    }
}

/// Temporary grant of permissions from a delegator to a delegatee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRule {
    delegation_id: DelegationId,
    delegator_email: EmailAddress,
    delegatee_email: EmailAddress,
    delegated_permissions: BTreeSet<Permission>,
    approval_status: ApprovalStatus,
    is_active: bool,
    end_date: Option<DateTime<Utc>>,
    reason: Option<String>,
    created_at: DateTime<Utc>,
    decided_by: Option<String>,
    decided_at: Option<DateTime<Utc>>,
}

/// Stored fields used to rebuild a delegation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationRuleParts {
    /// Stable identifier.
    pub delegation_id: DelegationId,
    /// User handing off permissions.
    pub delegator_email: EmailAddress,
    /// User receiving permissions.
    pub delegatee_email: EmailAddress,
    /// Permissions handed off.
    pub delegated_permissions: BTreeSet<Permission>,
    /// Approval dimension.
    pub approval_status: ApprovalStatus,
    /// Activation flag.
    pub is_active: bool,
    /// Optional expiry; absent means no expiry.
    pub end_date: Option<DateTime<Utc>>,
    /// Free-text justification.
    pub reason: Option<String>,
    /// Request timestamp.
    pub created_at: DateTime<Utc>,
    /// Admin subject that decided the request.
    pub decided_by: Option<String>,
    /// Decision timestamp.
    pub decided_at: Option<DateTime<Utc>>,
}

impl DelegationRule {
    /// Creates a pending, inactive delegation request.
    pub fn request(
        delegator_email: EmailAddress,
        delegatee_email: EmailAddress,
        delegated_permissions: BTreeSet<Permission>,
        end_date: Option<DateTime<Utc>>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        if delegated_permissions.is_empty() {
            return Err(AppError::Validation(
                "delegation must grant at least one permission".to_owned(),
            ));
        }

        if delegator_email == delegatee_email {
            return Err(AppError::Validation(
                "delegator and delegatee must be different users".to_owned(),
            ));
        }

        if let Some(end_date) = end_date
            && end_date <= now
        {
            return Err(AppError::Validation(
                "delegation end_date must be in the future".to_owned(),
            ));
        }

        let reason = reason
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            delegation_id: DelegationId::new(),
            delegator_email,
            delegatee_email,
            delegated_permissions,
            approval_status: ApprovalStatus::Pending,
            is_active: false,
            end_date,
            reason,
            created_at: now,
            decided_by: None,
            decided_at: None,
        })
    }

    /// Rebuilds a rule from stored fields.
    #[must_use]
    pub fn from_parts(parts: DelegationRuleParts) -> Self {
        Self {
            delegation_id: parts.delegation_id,
            delegator_email: parts.delegator_email,
            delegatee_email: parts.delegatee_email,
            delegated_permissions: parts.delegated_permissions,
            approval_status: parts.approval_status,
            is_active: parts.is_active,
            end_date: parts.end_date,
            reason: parts.reason,
            created_at: parts.created_at,
            decided_by: parts.decided_by,
            decided_at: parts.decided_at,
        }
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn delegation_id(&self) -> DelegationId {
        self.delegation_id
    }

    /// Returns the delegator email.
    #[must_use]
    pub fn delegator_email(&self) -> &EmailAddress {
        &self.delegator_email
    }

    /// Returns the delegatee email.
    #[must_use]
    pub fn delegatee_email(&self) -> &EmailAddress {
        &self.delegatee_email
    }

    /// Returns the delegated permissions.
    #[must_use]
    pub fn delegated_permissions(&self) -> &BTreeSet<Permission> {
        &self.delegated_permissions
    }

    /// Returns the approval status.
    #[must_use]
    pub fn approval_status(&self) -> ApprovalStatus {
        self.approval_status
    }

    /// Returns the activation flag.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the optional expiry.
    #[must_use]
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Returns the justification, if one was given.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the request timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the deciding admin subject.
    #[must_use]
    pub fn decided_by(&self) -> Option<&str> {
        self.decided_by.as_deref()
    }

    /// Returns the decision timestamp.
    #[must_use]
    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    /// Returns whether the end date has passed. A rule without end date never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date.is_some_and(|end_date| end_date <= now)
    }

    /// Returns whether the rule currently grants anything.
    #[must_use]
    pub fn grants_at(&self, now: DateTime<Utc>) -> bool {
        self.approval_status == ApprovalStatus::Approved
            && self.is_active
            && !self.is_expired_at(now)
    }

    /// Returns whether the rule currently grants the permission.
    #[must_use]
    pub fn grants_permission_at(&self, permission: &Permission, now: DateTime<Utc>) -> bool {
        self.grants_at(now) && self.delegated_permissions.contains(permission)
    }

    /// Applies an admin decision. Approval activates the rule; rejection deactivates it.
    pub fn decide(
        &mut self,
        approved: bool,
        decided_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.approval_status = self.approval_status.decide(approved)?;
        self.is_active = approved;
        self.decided_by = Some(decided_by.into());
        self.decided_at = Some(now);
        Ok(())
    }

    /// Toggles the activation flag of a decided rule.
    pub fn set_active(&mut self, is_active: bool) -> AppResult<()> {
        if self.is_active == is_active {
            return Err(AppError::Conflict(format!(
                "delegation '{}' is already {}",
                self.delegation_id,
                if is_active { "active" } else { "inactive" }
            )));
        }

        if is_active && self.approval_status != ApprovalStatus::Approved {
            return Err(AppError::Conflict(format!(
                "delegation '{}' cannot be activated while {}",
                self.delegation_id,
                self.approval_status.as_str()
            )));
        }

        self.is_active = is_active;
        Ok(())
    }
}
