use baladiya_core::{AppError, AppResult, UserIdentity};
use baladiya_domain::{User, UserId};

use crate::{AuditLogEntry, AuditLogQuery, UserListQuery};

use super::SecurityAdminService;

const MAX_PAGE_SIZE: usize = 200;

impl SecurityAdminService {
    /// Returns a page of the user directory.
    pub async fn list_users(
        &self,
        actor: &UserIdentity,
        query: UserListQuery,
    ) -> AppResult<Vec<User>> {
        self.authorization_service.require_admin(actor).await?;

        self.user_repository
            .list_users(UserListQuery {
                limit: query.limit.clamp(1, MAX_PAGE_SIZE),
                offset: query.offset,
            })
            .await
    }

    /// Returns recent audit entries.
    pub async fn list_audit_log(
        &self,
        actor: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.authorization_service.require_admin(actor).await?;

        self.audit_log_repository
            .list_recent_entries(AuditLogQuery {
                limit: query.limit.clamp(1, MAX_PAGE_SIZE),
                ..query
            })
            .await
    }

    pub(super) async fn find_user(&self, user_id: UserId) -> AppResult<User> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }
}
