use std::time::Duration;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use baladiya_core::AppError;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::api_config::ApiConfig;
use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    config: &ApiConfig,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/permissions/check",
            post(handlers::permissions::check_permission_handler),
        )
        .route(
            "/api/delegations",
            get(handlers::delegations::list_delegations_handler)
                .post(handlers::delegations::create_delegation_handler),
        )
        .route(
            "/api/delegations/approval",
            post(handlers::delegations::approve_delegation_handler),
        )
        .route(
            "/api/delegations/{delegation_id}/active",
            put(handlers::delegations::set_delegation_active_handler),
        )
        .route(
            "/api/field-security/filter",
            post(handlers::field_security::filter_fields_handler),
        )
        .route("/api/gates", get(handlers::gates::list_gates_handler))
        .route(
            "/api/gates/decisions",
            post(handlers::gates::submit_gate_decision_handler),
        )
        .route(
            "/api/gates/{entity_type}/{entity_id}/decisions",
            get(handlers::gates::list_gate_decisions_handler),
        )
        .route(
            "/api/security/roles",
            get(handlers::security::list_roles_handler).put(handlers::security::save_role_handler),
        )
        .route("/api/security/users", get(handlers::security::list_users_handler))
        .route(
            "/api/security/role-assignments",
            post(handlers::security::assign_role_handler),
        )
        .route(
            "/api/security/role-unassignments",
            post(handlers::security::unassign_role_handler),
        )
        .route(
            "/api/security/audit-log",
            get(handlers::security::list_audit_log_handler),
        )
        .route("/auth/me", get(auth::me_handler))
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = cors::build_cors_layer(&config.frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
