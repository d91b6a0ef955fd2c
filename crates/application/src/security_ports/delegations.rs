use async_trait::async_trait;

use baladiya_core::AppResult;
use baladiya_domain::{ApprovalStatus, DelegationId, DelegationRule, EmailAddress};

/// Filters for delegation listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationQuery {
    /// Only rules received by this user.
    pub delegatee_email: Option<EmailAddress>,
    /// Only rules granted by this user.
    pub delegator_email: Option<EmailAddress>,
    /// Only rules where this user is delegator or delegatee.
    pub participant_email: Option<EmailAddress>,
    /// Only rules in this approval state.
    pub approval_status: Option<ApprovalStatus>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

/// Stored state an update is conditioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegationRevision {
    /// Approval status the stored rule must still have.
    pub approval_status: ApprovalStatus,
    /// Activation flag the stored rule must still have.
    pub is_active: bool,
}

impl DelegationRevision {
    /// Captures the current state of a loaded rule.
    #[must_use]
    pub fn of(delegation: &DelegationRule) -> Self {
        Self {
            approval_status: delegation.approval_status(),
            is_active: delegation.is_active(),
        }
    }

    /// Returns whether a stored rule still has this state.
    #[must_use]
    pub fn matches(&self, delegation: &DelegationRule) -> bool {
        *self == Self::of(delegation)
    }
}

/// Repository port for delegation rules. Rules are never deleted.
#[async_trait]
pub trait DelegationRepository: Send + Sync {
    /// Lists approved and active rules received by the delegatee.
    ///
    /// Expiry is not applied here; callers filter with `DelegationRule::grants_at`.
    async fn list_active_for_delegatee(
        &self,
        delegatee_email: &EmailAddress,
    ) -> AppResult<Vec<DelegationRule>>;

    /// Finds one rule.
    async fn find_delegation(&self, delegation_id: DelegationId)
    -> AppResult<Option<DelegationRule>>;

    /// Persists a newly requested rule.
    async fn create_delegation(&self, delegation: &DelegationRule) -> AppResult<()>;

    /// Persists the approval and activation state of an existing rule.
    ///
    /// The write only applies while the stored rule still has the
    /// `expected` state. Otherwise it fails with `Conflict`, or with
    /// `NotFound` when the rule is missing.
    async fn update_delegation(
        &self,
        delegation: &DelegationRule,
        expected: DelegationRevision,
    ) -> AppResult<()>;

    /// Lists rules newest first.
    async fn list_delegations(&self, query: &DelegationQuery) -> AppResult<Vec<DelegationRule>>;
}
