use baladiya_application::AuditLogEntry;
use baladiya_domain::{RoleDefinition, User};

use super::{AuditLogEntryResponse, RoleResponse, UserResponse};

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            name: value.name().as_str().to_owned(),
            permissions: value
                .permissions()
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            email: value.email().as_str().to_owned(),
            display_name: value.display_name().to_owned(),
            role: value.role().as_str().to_owned(),
            assigned_roles: value
                .assigned_roles()
                .iter()
                .map(|role| role.as_str().to_owned())
                .collect(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            subject: value.subject,
            action: value.action,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            detail: value.detail,
            created_at: value.created_at,
        }
    }
}
