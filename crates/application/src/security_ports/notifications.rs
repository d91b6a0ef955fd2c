use async_trait::async_trait;

use baladiya_core::AppResult;

/// Port for sending transactional emails.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text or HTML email.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}
