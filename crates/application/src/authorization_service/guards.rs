use baladiya_core::{AppError, AppResult, UserIdentity};
use baladiya_domain::{RoleName, User};

use super::{AuthorizationService, SubjectAccess};

impl AuthorizationService {
    /// Ensures the caller's primary role is admin and returns the caller.
    pub async fn require_admin(&self, actor: &UserIdentity) -> AppResult<User> {
        let user = self.require_known_user(actor).await?;

        if !user.role().is_admin() {
            return Err(AppError::Forbidden(format!(
                "subject '{}' is not an administrator",
                actor.subject()
            )));
        }

        Ok(user)
    }

    /// Loads the caller with its roles and admin flag.
    pub async fn subject_access(&self, actor: &UserIdentity) -> AppResult<SubjectAccess> {
        let user = self.require_known_user(actor).await?;
        let is_admin = user.role().is_admin();

        let mut roles = user.assigned_roles().clone();
        roles.insert(user.role().clone());

        Ok(SubjectAccess {
            user,
            is_admin,
            roles,
        })
    }

    async fn require_known_user(&self, actor: &UserIdentity) -> AppResult<User> {
        self.find_actor(actor).await?.ok_or_else(|| {
            AppError::Unauthorized(format!(
                "subject '{}' is not a known user",
                actor.subject()
            ))
        })
    }
}

impl SubjectAccess {
    /// Returns whether the caller may act where `role` is required.
    #[must_use]
    pub fn has_role(&self, role: &RoleName) -> bool {
        self.is_admin || self.roles.contains(role)
    }
}
