use std::collections::BTreeSet;
use std::sync::Arc;

use baladiya_application::{
    AuthorizationService, DelegationPolicy, DelegationService, EmailService,
    FieldSecurityService, GateService, SecurityAdminService, UserService,
};
use baladiya_core::{AppError, AppResult};
use baladiya_domain::{EmailAddress, FieldSecurityPolicy, GateRegistry};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::email::build_email_service;

mod repositories;

pub(crate) use repositories::RepositorySet;

/// Settings that shape the services independently of storage.
pub(crate) struct StateSettings {
    pub(crate) frontend_url: String,
    pub(crate) bootstrap_token: String,
    pub(crate) bootstrap_admin_emails: BTreeSet<EmailAddress>,
    pub(crate) delegation_policy: DelegationPolicy,
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let bootstrap_admin_emails = config
        .bootstrap_admin_emails
        .iter()
        .map(|email| EmailAddress::new(email.as_str()))
        .collect::<AppResult<BTreeSet<_>>>()?;

    let settings = StateSettings {
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
        bootstrap_admin_emails,
        delegation_policy: DelegationPolicy {
            require_end_date: config.delegation_require_end_date,
        },
    };

    assemble_app_state(
        RepositorySet::postgres(&pool),
        build_email_service(config)?,
        settings,
    )
}

pub(crate) fn assemble_app_state(
    repositories: RepositorySet,
    email_service: Arc<dyn EmailService>,
    settings: StateSettings,
) -> AppResult<AppState> {
    let authorization_service = AuthorizationService::new(
        repositories.user_repository.clone(),
        repositories.role_repository.clone(),
        repositories.delegation_repository.clone(),
    );

    let delegation_service = DelegationService::new(
        authorization_service.clone(),
        repositories.user_repository.clone(),
        repositories.delegation_repository,
        repositories.audit_repository.clone(),
        email_service,
        settings.delegation_policy,
    );

    let field_security_service = FieldSecurityService::new(
        authorization_service.clone(),
        FieldSecurityPolicy::municipal_defaults()?,
    );

    let gate_service = GateService::new(
        authorization_service.clone(),
        GateRegistry::municipal_defaults()?,
        repositories.gate_decision_repository,
        repositories.audit_repository.clone(),
    );

    let security_admin_service = SecurityAdminService::new(
        authorization_service.clone(),
        repositories.user_repository.clone(),
        repositories.role_repository,
        repositories.audit_repository,
        repositories.audit_log_repository,
    );

    let user_service = UserService::new(
        repositories.user_repository,
        settings.bootstrap_admin_emails,
    );

    Ok(AppState {
        authorization_service,
        delegation_service,
        field_security_service,
        gate_service,
        security_admin_service,
        user_service,
        frontend_url: settings.frontend_url,
        bootstrap_token: settings.bootstrap_token,
    })
}
