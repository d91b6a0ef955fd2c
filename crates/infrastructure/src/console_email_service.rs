//! Development email sender that writes messages to the log.

use async_trait::async_trait;
use tracing::info;

use baladiya_application::EmailService;
use baladiya_core::AppResult;

/// Email service that logs notifications instead of delivering them.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailService;

impl ConsoleEmailService {
    /// Creates a console email service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for ConsoleEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        info!(
            to,
            subject,
            has_html = html_body.is_some(),
            body = text_body,
            "notification email (console delivery)"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use baladiya_application::EmailService;

    use super::ConsoleEmailService;

    #[tokio::test]
    async fn console_delivery_always_succeeds() {
        let sent = ConsoleEmailService::new()
            .send_email("alice@baladiya.test", "Delegation approved", "body", None)
            .await;

        assert!(sent.is_ok());
    }
}
