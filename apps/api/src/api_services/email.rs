use std::sync::Arc;

use baladiya_application::EmailService;
use baladiya_core::AppError;
use baladiya_infrastructure::{ConsoleEmailService, SmtpEmailConfig, SmtpEmailService};

use crate::api_config::{ApiConfig, EmailProviderConfig};

pub(super) fn build_email_service(config: &ApiConfig) -> Result<Arc<dyn EmailService>, AppError> {
    let service: Arc<dyn EmailService> = match &config.email_provider {
        EmailProviderConfig::Console => {
            tracing::info!("delegation notifications are written to the log");
            Arc::new(ConsoleEmailService::new())
        }
        EmailProviderConfig::Smtp(smtp) => {
            tracing::info!(
                host = %smtp.host,
                port = smtp.port,
                "delegation notifications use smtp"
            );
            Arc::new(SmtpEmailService::new(SmtpEmailConfig {
                host: smtp.host.clone(),
                port: smtp.port,
                username: smtp.username.clone(),
                password: smtp.password.clone(),
                from_address: smtp.from_address.clone(),
            })?)
        }
    };

    Ok(service)
}
