use async_trait::async_trait;

use baladiya_core::AppResult;
use baladiya_domain::{RoleDefinition, RoleName};

/// Repository port for the role catalog.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Loads the definitions of the named roles in one query. Unknown names are skipped.
    async fn list_roles_by_names(&self, names: &[RoleName]) -> AppResult<Vec<RoleDefinition>>;

    /// Lists every role ordered by name.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Finds one role.
    async fn find_role(&self, name: &RoleName) -> AppResult<Option<RoleDefinition>>;

    /// Creates a role or replaces its permissions.
    async fn save_role(&self, role: &RoleDefinition) -> AppResult<()>;
}
