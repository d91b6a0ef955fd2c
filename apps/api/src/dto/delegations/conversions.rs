use baladiya_application::DelegationDecisionOutcome;
use baladiya_domain::DelegationRule;

use super::{DelegationApprovalResponse, DelegationResponse};

impl From<DelegationRule> for DelegationResponse {
    fn from(value: DelegationRule) -> Self {
        Self {
            delegation_id: value.delegation_id().to_string(),
            delegator_email: value.delegator_email().as_str().to_owned(),
            delegatee_email: value.delegatee_email().as_str().to_owned(),
            delegated_permissions: value
                .delegated_permissions()
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
            approval_status: value.approval_status().as_str().to_owned(),
            is_active: value.is_active(),
            end_date: value.end_date().map(|end_date| end_date.to_rfc3339()),
            reason: value.reason().map(ToOwned::to_owned),
            created_at: value.created_at().to_rfc3339(),
            decided_by: value.decided_by().map(ToOwned::to_owned),
            decided_at: value.decided_at().map(|decided_at| decided_at.to_rfc3339()),
        }
    }
}

impl From<DelegationDecisionOutcome> for DelegationApprovalResponse {
    fn from(value: DelegationDecisionOutcome) -> Self {
        Self {
            success: true,
            approved: value.approved,
        }
    }
}
