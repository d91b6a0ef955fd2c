mod auth;
mod common;
mod delegations;
mod field_security;
mod gates;
mod permissions;
mod security;

pub use auth::BootstrapRequest;
pub use common::{HealthResponse, UserIdentityResponse};
pub use delegations::{
    CreateDelegationRequest, DelegationApprovalRequest, DelegationApprovalResponse,
    DelegationResponse, SetDelegationActiveRequest,
};
pub use field_security::{FieldSecurityFilterRequest, FieldSecurityFilterResponse};
pub use gates::{
    GateDecisionOptionResponse, GateDecisionResponse, GateResponse, SubmitGateDecisionRequest,
};
pub use permissions::{PermissionCheckRequest, PermissionCheckResponse};
pub use security::{
    AuditLogEntryResponse, RoleAssignmentRequest, RoleResponse, SaveRoleRequest, UserResponse,
};

#[cfg(test)]
mod tests {
    use super::{
        AuditLogEntryResponse, BootstrapRequest, CreateDelegationRequest,
        DelegationApprovalRequest, DelegationApprovalResponse, DelegationResponse,
        FieldSecurityFilterRequest, FieldSecurityFilterResponse, GateDecisionOptionResponse,
        GateDecisionResponse, GateResponse, HealthResponse, PermissionCheckRequest,
        PermissionCheckResponse, RoleAssignmentRequest, RoleResponse, SaveRoleRequest,
        SetDelegationActiveRequest, SubmitGateDecisionRequest, UserIdentityResponse,
        UserResponse,
    };

    use crate::error::ErrorResponse;
    use serde_json::json;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        HealthResponse::export(&config)?;
        UserIdentityResponse::export(&config)?;
        BootstrapRequest::export(&config)?;
        PermissionCheckRequest::export(&config)?;
        PermissionCheckResponse::export(&config)?;
        DelegationApprovalRequest::export(&config)?;
        DelegationApprovalResponse::export(&config)?;
        CreateDelegationRequest::export(&config)?;
        SetDelegationActiveRequest::export(&config)?;
        DelegationResponse::export(&config)?;
        FieldSecurityFilterRequest::export(&config)?;
        FieldSecurityFilterResponse::export(&config)?;
        GateResponse::export(&config)?;
        GateDecisionOptionResponse::export(&config)?;
        SubmitGateDecisionRequest::export(&config)?;
        GateDecisionResponse::export(&config)?;
        SaveRoleRequest::export(&config)?;
        RoleResponse::export(&config)?;
        RoleAssignmentRequest::export(&config)?;
        UserResponse::export(&config)?;
        AuditLogEntryResponse::export(&config)?;
        ErrorResponse::export(&config)?;

        Ok(())
    }

    #[test]
    fn permission_check_uses_camel_case_wire_names() {
        let request: PermissionCheckRequest = serde_json::from_value(json!({
            "permission": "pilot_manage",
            "userId": "0b6f8f2e-8a55-4d0c-9a38-03f1c1f0a8d1"
        }))
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(
            request.user_id.as_deref(),
            Some("0b6f8f2e-8a55-4d0c-9a38-03f1c1f0a8d1")
        );

        let response = serde_json::to_value(PermissionCheckResponse {
            has_permission: true,
            source: "role".to_owned(),
            roles: vec!["pilot_lead".to_owned()],
        })
        .unwrap_or_default();
        assert_eq!(
            response,
            json!({ "hasPermission": true, "source": "role", "roles": ["pilot_lead"] })
        );
    }

    #[test]
    fn field_filter_request_defaults_fields_to_empty() {
        let request: FieldSecurityFilterRequest = serde_json::from_value(json!({
            "entityType": "pilot",
            "data": { "budget": 10 }
        }))
        .unwrap_or_else(|_| unreachable!());
        assert!(request.fields.is_empty());
        assert_eq!(request.entity_type, "pilot");
    }
}
