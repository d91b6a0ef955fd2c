mod audit;
mod delegations;
mod gates;
mod notifications;
mod roles;
mod users;

pub use audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};
pub use delegations::{DelegationQuery, DelegationRepository, DelegationRevision};
pub use gates::{GateDecisionRecord, GateDecisionRepository};
pub use notifications::EmailService;
pub use roles::RoleRepository;
pub use users::{UserListQuery, UserRepository};
