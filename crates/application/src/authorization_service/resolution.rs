use chrono::{DateTime, Utc};

use baladiya_core::{AppError, AppResult, UserIdentity};
use baladiya_domain::{Permission, PermissionSource, User, UserId};

use super::{AuthorizationService, PermissionResolution};

impl AuthorizationService {
    /// Resolves whether a user holds a permission.
    ///
    /// Without `target_user_id` the actor is checked. Checking another user
    /// requires the actor to be admin. An unauthenticated actor, an unknown
    /// actor and an unknown target all resolve to a denial.
    pub async fn resolve(
        &self,
        actor: Option<&UserIdentity>,
        permission: &Permission,
        target_user_id: Option<UserId>,
    ) -> AppResult<PermissionResolution> {
        let Some(actor) = actor else {
            tracing::debug!(permission = %permission, "denied permission to anonymous caller");
            return Ok(PermissionResolution::denied(Vec::new()));
        };

        let Some(actor_user) = self.find_actor(actor).await? else {
            tracing::debug!(
                permission = %permission,
                subject = actor.subject(),
                "denied permission to subject missing from directory"
            );
            return Ok(PermissionResolution::denied(Vec::new()));
        };

        let target = match target_user_id {
            Some(target_user_id) if target_user_id != actor_user.user_id() => {
                if !actor_user.role().is_admin() {
                    return Err(AppError::Forbidden(format!(
                        "subject '{}' may not check permissions of other users",
                        actor.subject()
                    )));
                }

                match self.user_repository.find_by_id(target_user_id).await? {
                    Some(target) => target,
                    None => {
                        tracing::debug!(
                            permission = %permission,
                            target = %target_user_id,
                            "denied permission to unknown target user"
                        );
                        return Ok(PermissionResolution::denied(Vec::new()));
                    }
                }
            }
            _ => actor_user,
        };

        self.resolve_for_user(&target, permission, Utc::now()).await
    }

    /// Resolves a permission for a loaded user at a point in time.
    pub(crate) async fn resolve_for_user(
        &self,
        user: &User,
        permission: &Permission,
        now: DateTime<Utc>,
    ) -> AppResult<PermissionResolution> {
        let roles = user.role_names();

        let resolution = if user.role().is_admin() {
            PermissionResolution::granted(PermissionSource::Admin, roles)
        } else if self.granted_by_roles(user, permission).await? {
            PermissionResolution::granted(PermissionSource::Role, roles)
        } else {
            let delegations = self
                .delegation_repository
                .list_active_for_delegatee(user.email())
                .await?;

            match delegations
                .iter()
                .find(|delegation| delegation.grants_permission_at(permission, now))
            {
                Some(delegation) => PermissionResolution {
                    delegation_id: Some(delegation.delegation_id()),
                    ..PermissionResolution::granted(PermissionSource::Delegation, roles)
                },
                None => PermissionResolution::denied(roles),
            }
        };

        tracing::debug!(
            permission = %permission,
            target = %user.user_id(),
            source = resolution.source.as_str(),
            allowed = resolution.allowed,
            "resolved permission"
        );

        Ok(resolution)
    }

    /// Returns whether the user holds the permission without counting delegations.
    pub async fn held_directly(&self, user: &User, permission: &Permission) -> AppResult<bool> {
        if user.role().is_admin() {
            return Ok(true);
        }

        self.granted_by_roles(user, permission).await
    }

    pub(super) async fn find_actor(&self, actor: &UserIdentity) -> AppResult<Option<User>> {
        let Ok(user_id) = UserId::parse(actor.subject()) else {
            return Ok(None);
        };

        self.user_repository.find_by_id(user_id).await
    }

    async fn granted_by_roles(&self, user: &User, permission: &Permission) -> AppResult<bool> {
        if user.assigned_roles().is_empty() {
            return Ok(false);
        }

        let names = user.assigned_roles().iter().cloned().collect::<Vec<_>>();
        let definitions = self.role_repository.list_roles_by_names(&names).await?;

        Ok(definitions
            .iter()
            .any(|definition| definition.grants(permission)))
    }
}
