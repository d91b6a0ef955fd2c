use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use baladiya_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct SmtpRuntimeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Console,
    Smtp(SmtpRuntimeConfig),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub bootstrap_admin_emails: Vec<String>,
    pub delegation_require_end_date: bool,
    pub request_timeout_seconds: u64,
    pub email_provider: EmailProviderConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let bootstrap_token = required_non_empty_env("AUTH_BOOTSTRAP_TOKEN")?;
        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env_flag("SESSION_COOKIE_SECURE");
        let delegation_require_end_date = env_flag("DELEGATION_REQUIRE_END_DATE");

        let bootstrap_admin_emails = env::var("BOOTSTRAP_ADMIN_EMAILS")
            .map(|value| parse_email_list(&value))
            .unwrap_or_default();

        let request_timeout_seconds = match env::var("REQUEST_TIMEOUT_SECONDS") {
            Ok(value) => value
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "REQUEST_TIMEOUT_SECONDS must be a positive integer, got '{value}'"
                    ))
                })?,
            Err(_) => 10,
        };

        let email_provider = match env::var("EMAIL_PROVIDER")
            .unwrap_or_else(|_| "console".to_owned())
            .as_str()
        {
            "console" => EmailProviderConfig::Console,
            "smtp" => {
                let port = required_non_empty_env("SMTP_PORT")?
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid SMTP_PORT: {error}")))?;
                EmailProviderConfig::Smtp(SmtpRuntimeConfig {
                    host: required_non_empty_env("SMTP_HOST")?,
                    port,
                    username: required_non_empty_env("SMTP_USERNAME")?,
                    password: required_non_empty_env("SMTP_PASSWORD")?,
                    from_address: required_non_empty_env("SMTP_FROM_ADDRESS")?,
                })
            }
            other => {
                return Err(AppError::Validation(format!(
                    "EMAIL_PROVIDER must be either 'console' or 'smtp', got '{other}'"
                )));
            }
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            bootstrap_token,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
            bootstrap_admin_emails,
            delegation_require_end_date,
            request_timeout_seconds,
            email_provider,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true")
}

fn parse_email_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_email_list;

    #[test]
    fn email_list_skips_blank_entries() {
        assert_eq!(
            parse_email_list(" mayor@city.gov , ,ops@city.gov,"),
            vec!["mayor@city.gov".to_owned(), "ops@city.gov".to_owned()]
        );
    }

    #[test]
    fn empty_email_list_is_empty() {
        assert!(parse_email_list("").is_empty());
    }
}
