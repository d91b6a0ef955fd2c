//! User directory types.

use std::collections::BTreeSet;

use baladiya_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::security::RoleName;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport or session value into a user identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| AppError::Validation(format!("invalid user id '{value}'")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated email address, stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Directory user with one primary role and any number of secondary roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    user_id: UserId,
    email: EmailAddress,
    display_name: String,
    role: RoleName,
    assigned_roles: BTreeSet<RoleName>,
    created_at: DateTime<Utc>,
}

impl User {
    /// Creates a user record.
    #[must_use]
    pub fn new(
        user_id: UserId,
        email: EmailAddress,
        display_name: impl Into<String>,
        role: RoleName,
        assigned_roles: BTreeSet<RoleName>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            email,
            display_name: display_name.into(),
            role,
            assigned_roles,
            created_at,
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the unique email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the primary role.
    #[must_use]
    pub fn role(&self) -> &RoleName {
        &self.role
    }

    /// Returns the secondary roles.
    #[must_use]
    pub fn assigned_roles(&self) -> &BTreeSet<RoleName> {
        &self.assigned_roles
    }

    /// Returns the provisioning timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the primary role followed by the secondary roles, de-duplicated.
    #[must_use]
    pub fn role_names(&self) -> Vec<String> {
        let mut names = vec![self.role.as_str().to_owned()];
        names.extend(
            self.assigned_roles
                .iter()
                .filter(|role| *role != &self.role)
                .map(|role| role.as_str().to_owned()),
        );
        names
    }

    /// Adds a secondary role. Returns `false` when already present.
    pub fn assign_role(&mut self, role: RoleName) -> bool {
        self.assigned_roles.insert(role)
    }

    /// Removes a secondary role. Returns `false` when it was not assigned.
    pub fn unassign_role(&mut self, role: &RoleName) -> bool {
        self.assigned_roles.remove(role)
    }
}
