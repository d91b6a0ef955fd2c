//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_email_service;
mod in_memory_security_store;
mod postgres_audit_log_repository;
mod postgres_audit_repository;
mod postgres_delegation_repository;
mod postgres_gate_decision_repository;
mod postgres_role_repository;
mod postgres_user_repository;
mod smtp_email_service;

#[cfg(test)]
mod postgres_test_support;

pub use console_email_service::ConsoleEmailService;
pub use in_memory_security_store::InMemorySecurityStore;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_delegation_repository::PostgresDelegationRepository;
pub use postgres_gate_decision_repository::PostgresGateDecisionRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
