//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod delegation;
mod field_security;
mod gate;
mod security;
mod user;

pub use delegation::{ApprovalStatus, DelegationId, DelegationRule, DelegationRuleParts};
pub use field_security::{EntityType, FieldFilterOutcome, FieldRule, FieldSecurityPolicy};
pub use gate::{AutoAction, DecisionOption, GateConfig, GateRegistry, StageTransition};
pub use security::{
    ADMIN_ROLE, AuditAction, DEFAULT_USER_ROLE, Permission, PermissionSource, RoleDefinition,
    RoleName,
};
pub use user::{EmailAddress, User, UserId};
