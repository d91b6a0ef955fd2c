use async_trait::async_trait;

use baladiya_core::AppResult;
use baladiya_domain::{EmailAddress, RoleName, User, UserId};

/// Pagination for the user directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserListQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

/// Repository port for the user directory.
///
/// Read methods report backend failures as `AppError::StoreRead`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds a user by email address.
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>>;

    /// Creates a user. Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: &User) -> AppResult<()>;

    /// Adds one secondary role without touching the others.
    ///
    /// Fails with `Conflict` when the user already has the role and with
    /// `NotFound` when the user is missing.
    async fn add_assigned_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()>;

    /// Removes one secondary role without touching the others.
    ///
    /// Fails with `NotFound` when the user is missing or lacks the role.
    async fn remove_assigned_role(&self, user_id: UserId, role_name: &RoleName)
    -> AppResult<()>;

    /// Lists users ordered by email.
    async fn list_users(&self, query: UserListQuery) -> AppResult<Vec<User>>;
}
