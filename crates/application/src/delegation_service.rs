//! Delegation requests, admin decisions and activation.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use baladiya_domain::DelegationRule;

use crate::{
    AuditRepository, AuthorizationService, DelegationRepository, EmailService, UserRepository,
};

mod decisions;
mod notifications;
mod requests;


/// Deployment switches for delegation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DelegationPolicy {
    /// Rejects requests without an end date.
    pub require_end_date: bool,
}

/// Input for a delegator handing off permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDelegationInput {
    /// User receiving the permissions.
    pub delegatee_email: String,
    /// Permissions to hand off.
    pub permissions: Vec<String>,
    /// Optional expiry.
    pub end_date: Option<DateTime<Utc>>,
    /// Optional justification shown to approvers.
    pub reason: Option<String>,
}

/// Result of an admin decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationDecisionOutcome {
    /// Rule after the decision.
    pub delegation: DelegationRule,
    /// Whether the request was approved.
    pub approved: bool,
}

/// Application service for the delegation workflow.
#[derive(Clone)]
pub struct DelegationService {
    authorization_service: AuthorizationService,
    user_repository: Arc<dyn UserRepository>,
    delegation_repository: Arc<dyn DelegationRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    email_service: Arc<dyn EmailService>,
    policy: DelegationPolicy,
}

impl DelegationService {
    /// Creates the delegation service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        user_repository: Arc<dyn UserRepository>,
        delegation_repository: Arc<dyn DelegationRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        email_service: Arc<dyn EmailService>,
        policy: DelegationPolicy,
    ) -> Self {
        Self {
            authorization_service,
            user_repository,
            delegation_repository,
            audit_repository,
            email_service,
            policy,
        }
    }
}
