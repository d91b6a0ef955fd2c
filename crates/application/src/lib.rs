//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod delegation_service;
mod field_security_service;
mod gate_service;
mod security_admin_service;
mod security_ports;
mod user_service;

#[cfg(test)]
mod test_support;

pub use authorization_service::{AuthorizationService, PermissionResolution, SubjectAccess};
pub use delegation_service::{
    DelegationDecisionOutcome, DelegationPolicy, DelegationService, RequestDelegationInput,
};
pub use field_security_service::{FieldSecurityService, FilterEntityPayloadInput};
pub use gate_service::{GateService, SubmitGateDecisionInput};
pub use security_admin_service::{SaveRoleInput, SecurityAdminService};
pub use security_ports::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    DelegationQuery, DelegationRepository, DelegationRevision, EmailService, GateDecisionRecord,
    GateDecisionRepository, RoleRepository, UserListQuery, UserRepository,
};
pub use user_service::UserService;
