use baladiya_domain::DelegationRule;

use super::DelegationService;
use super::requests::permission_list;

impl DelegationService {
    pub(super) async fn notify_approval(&self, delegation: &DelegationRule) {
        let permissions = permission_list(delegation);
        let until = delegation
            .end_date()
            .map(|end_date| format!("until {}", end_date.format("%Y-%m-%d %H:%M UTC")))
            .unwrap_or_else(|| "until revoked".to_owned());

        let messages = [
            (
                delegation.delegatee_email(),
                format!(
                    "{} delegated the following permissions to you {until}: {permissions}.",
                    delegation.delegator_email()
                ),
            ),
            (
                delegation.delegator_email(),
                format!(
                    "Your delegation of {permissions} to {} was approved and is active {until}.",
                    delegation.delegatee_email()
                ),
            ),
        ];

        for (recipient, text_body) in messages {
            if let Err(error) = self
                .email_service
                .send_email(recipient.as_str(), "Delegation approved", &text_body, None)
                .await
            {
                tracing::warn!(
                    delegation_id = %delegation.delegation_id(),
                    recipient = %recipient,
                    error = %error,
                    "failed to send delegation approval notification"
                );
            }
        }
    }
}
