//! User provisioning for operator sign-in.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use baladiya_core::{AppError, AppResult};
use baladiya_domain::{ADMIN_ROLE, DEFAULT_USER_ROLE, EmailAddress, RoleName, User, UserId};

use crate::UserRepository;

/// Application service for directory provisioning.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    bootstrap_admin_emails: Arc<BTreeSet<EmailAddress>>,
}

impl UserService {
    /// Creates the service. Users provisioned with one of `bootstrap_admin_emails`
    /// receive the admin primary role.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        bootstrap_admin_emails: BTreeSet<EmailAddress>,
    ) -> Self {
        Self {
            user_repository,
            bootstrap_admin_emails: Arc::new(bootstrap_admin_emails),
        }
    }

    /// Returns the user with this email, creating it on first sign-in.
    pub async fn ensure_user(&self, email: &str, display_name: Option<&str>) -> AppResult<User> {
        let email = EmailAddress::new(email)?;
        if let Some(user) = self.user_repository.find_by_email(&email).await? {
            return Ok(user);
        }

        let role = if self.bootstrap_admin_emails.contains(&email) {
            ADMIN_ROLE
        } else {
            DEFAULT_USER_ROLE
        };
        let display_name = display_name
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| {
                email
                    .as_str()
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_owned()
            });

        let user = User::new(
            UserId::new(),
            email.clone(),
            display_name,
            RoleName::new(role)?,
            BTreeSet::new(),
            Utc::now(),
        );

        match self.user_repository.create_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.user_id(), role, "provisioned user");
                Ok(user)
            }
            Err(AppError::Conflict(_)) => self
                .user_repository
                .find_by_email(&email)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!("user '{email}' vanished after conflict"))
                }),
            Err(error) => Err(error),
        }
    }

    /// Finds a user by identifier.
    pub async fn find_user(&self, user_id: UserId) -> AppResult<User> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }
}
