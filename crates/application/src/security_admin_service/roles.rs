use baladiya_core::{AppError, AppResult, UserIdentity};
use baladiya_domain::{AuditAction, Permission, RoleDefinition, RoleName, UserId};

use crate::AuditEvent;

use super::{SaveRoleInput, SecurityAdminService};

impl SecurityAdminService {
    /// Returns the role catalog.
    pub async fn list_roles(&self, actor: &UserIdentity) -> AppResult<Vec<RoleDefinition>> {
        self.authorization_service.require_admin(actor).await?;
        self.role_repository.list_roles().await
    }

    /// Creates a role or replaces its permissions and emits an audit event.
    pub async fn save_role(
        &self,
        actor: &UserIdentity,
        input: SaveRoleInput,
    ) -> AppResult<RoleDefinition> {
        let role = RoleDefinition::new(
            RoleName::new(input.name)?,
            Permission::parse_set(input.permissions)?,
        );
        self.authorization_service.require_admin(actor).await?;

        self.role_repository.save_role(&role).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::SecurityRoleSaved,
                resource_type: "role".to_owned(),
                resource_id: role.name().to_string(),
                detail: Some(format!(
                    "saved role '{}' with {} permissions",
                    role.name(),
                    role.permissions().len()
                )),
            })
            .await?;

        Ok(role)
    }

    /// Adds a secondary role to a user and emits an audit event.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        let role_name = RoleName::new(role_name)?;
        self.authorization_service.require_admin(actor).await?;

        if self.role_repository.find_role(&role_name).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_name}' does not exist"
            )));
        }

        let user = self.find_user(user_id).await?;
        self.user_repository
            .add_assigned_role(user_id, &role_name)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::SecurityRoleAssigned,
                resource_type: "user_role".to_owned(),
                resource_id: format!("{user_id}:{role_name}"),
                detail: Some(format!("assigned role '{role_name}' to '{}'", user.email())),
            })
            .await
    }

    /// Removes a secondary role from a user and emits an audit event.
    pub async fn unassign_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role_name: &str,
    ) -> AppResult<()> {
        let role_name = RoleName::new(role_name)?;
        self.authorization_service.require_admin(actor).await?;

        let user = self.find_user(user_id).await?;
        self.user_repository
            .remove_assigned_role(user_id, &role_name)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::SecurityRoleUnassigned,
                resource_type: "user_role".to_owned(),
                resource_id: format!("{user_id}:{role_name}"),
                detail: Some(format!(
                    "removed role '{role_name}' from '{}'",
                    user.email()
                )),
            })
            .await
    }
}
