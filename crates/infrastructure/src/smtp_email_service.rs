//! SMTP delivery through `lettre`.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use baladiya_application::EmailService;
use baladiya_core::{AppError, AppResult};

/// SMTP relay settings.
#[derive(Clone)]
pub struct SmtpEmailConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Sender email address.
    pub from_address: String,
}

/// Email service delivering through an authenticated SMTP relay.
#[derive(Clone)]
pub struct SmtpEmailService {
    from: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    /// Builds the relay transport once. Fails on an invalid sender or host.
    pub fn new(config: SmtpEmailConfig) -> AppResult<Self> {
        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|error| AppError::Validation(format!("invalid SMTP_FROM_ADDRESS: {error}")))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|error| {
                AppError::Internal(format!("failed to create SMTP transport: {error}"))
            })?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { from, mailer })
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        let to_mailbox = to
            .parse::<Mailbox>()
            .map_err(|error| AppError::Validation(format!("invalid recipient address: {error}")))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject);

        let message = match html_body {
            Some(html_body) => builder.multipart(MultiPart::alternative_plain_html(
                text_body.to_owned(),
                html_body.to_owned(),
            )),
            None => builder.body(text_body.to_owned()),
        }
        .map_err(|error| AppError::Internal(format!("failed to build email: {error}")))?;

        self.mailer
            .send(message)
            .await
            .map_err(|error| AppError::Internal(format!("failed to send email: {error}")))?;

        Ok(())
    }
}
