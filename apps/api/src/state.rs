use baladiya_application::{
    AuthorizationService, DelegationService, FieldSecurityService, GateService,
    SecurityAdminService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub delegation_service: DelegationService,
    pub field_security_service: FieldSecurityService,
    pub gate_service: GateService,
    pub security_admin_service: SecurityAdminService,
    pub user_service: UserService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
