use std::collections::BTreeSet;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use baladiya_application::{DelegationPolicy, RoleRepository, UserRepository};
use baladiya_core::{AppError, UserIdentity};
use baladiya_domain::{EmailAddress, Permission, RoleDefinition, RoleName, User, UserId};
use baladiya_infrastructure::{ConsoleEmailService, InMemorySecurityStore};
use chrono::Utc;
use serde_json::json;

use crate::api_services::{RepositorySet, StateSettings, assemble_app_state};
use crate::dto::{
    CreateDelegationRequest, DelegationApprovalRequest, FieldSecurityFilterRequest,
    PermissionCheckRequest, PermissionCheckResponse, RoleAssignmentRequest,
    SubmitGateDecisionRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

use super::delegations::{
    DelegationListQuery, approve_delegation_handler, create_delegation_handler,
    list_delegations_handler,
};
use super::field_security::filter_fields_handler;
use super::gates::{
    list_gate_decisions_handler, list_gates_handler, submit_gate_decision_handler,
};
use super::permissions::check_permission_handler;
use super::security::{PageQuery, assign_role_handler, list_roles_handler, list_users_handler};

struct Harness {
    state: AppState,
    store: Arc<InMemorySecurityStore>,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(InMemorySecurityStore::new());
        let state = assemble_app_state(
            RepositorySet::in_memory(&store),
            Arc::new(ConsoleEmailService::new()),
            StateSettings {
                frontend_url: "http://localhost:3000".to_owned(),
                bootstrap_token: "bootstrap-token".to_owned(),
                bootstrap_admin_emails: BTreeSet::new(),
                delegation_policy: DelegationPolicy::default(),
            },
        )
        .unwrap_or_else(|_| unreachable!());

        Self { state, store }
    }

    async fn role(&self, name: &str, permissions: &[&str]) {
        let role = RoleDefinition::new(
            RoleName::new(name).unwrap_or_else(|_| unreachable!()),
            Permission::parse_set(permissions.iter().copied()).unwrap_or_default(),
        );
        assert!(self.store.save_role(&role).await.is_ok());
    }

    async fn user(&self, address: &str, role: &str, assigned: &[&str]) -> (User, UserIdentity) {
        let user = User::new(
            UserId::new(),
            EmailAddress::new(address).unwrap_or_else(|_| unreachable!()),
            address,
            RoleName::new(role).unwrap_or_else(|_| unreachable!()),
            assigned
                .iter()
                .map(|name| RoleName::new(*name).unwrap_or_else(|_| unreachable!()))
                .collect(),
            Utc::now(),
        );
        assert!(self.store.create_user(&user).await.is_ok());

        let identity = UserIdentity::new(
            user.user_id().to_string(),
            user.display_name(),
            user.email().as_str(),
        );
        (user, identity)
    }

    async fn check(
        &self,
        identity: &UserIdentity,
        permission: &str,
        user_id: Option<String>,
    ) -> Result<PermissionCheckResponse, ApiError> {
        check_permission_handler(
            State(self.state.clone()),
            Extension(identity.clone()),
            Json(PermissionCheckRequest {
                permission: permission.to_owned(),
                user_id,
            }),
        )
        .await
        .map(|Json(response)| response)
    }
}

#[tokio::test]
async fn permission_check_reports_role_grant() {
    let harness = Harness::new();
    harness.role("pilot_lead", &["pilot_manage"]).await;
    let (_, lead) = harness.user("lead@baladiya.test", "user", &["pilot_lead"]).await;

    let Ok(granted) = harness.check(&lead, "pilot_manage", None).await else {
        panic!("permission check should succeed");
    };
    let Ok(denied) = harness.check(&lead, "policy_manage", None).await else {
        panic!("permission check should succeed");
    };

    assert!(granted.has_permission);
    assert_eq!(granted.source, "role");
    assert!(granted.roles.contains(&"pilot_lead".to_owned()));
    assert!(!denied.has_permission);
    assert_eq!(denied.source, "none");
}

#[tokio::test]
async fn checking_another_user_requires_admin() {
    let harness = Harness::new();
    let (target, _) = harness.user("target@baladiya.test", "user", &[]).await;
    let (_, clerk) = harness.user("clerk@baladiya.test", "user", &[]).await;
    let (_, admin) = harness.user("admin@baladiya.test", "admin", &[]).await;

    let from_clerk = harness
        .check(&clerk, "pilot_manage", Some(target.user_id().to_string()))
        .await;
    let from_admin = harness
        .check(&admin, "pilot_manage", Some(target.user_id().to_string()))
        .await;

    assert!(matches!(from_clerk, Err(ApiError(AppError::Forbidden(_)))));
    assert!(matches!(from_admin, Ok(response) if !response.has_permission));
}

#[tokio::test]
async fn malformed_target_user_id_is_a_validation_error() {
    let harness = Harness::new();
    let (_, admin) = harness.user("admin@baladiya.test", "admin", &[]).await;

    let result = harness
        .check(&admin, "pilot_manage", Some("not-a-uuid".to_owned()))
        .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn approved_delegation_grants_permission_to_delegatee() {
    let harness = Harness::new();
    harness.role("pilot_lead", &["pilot_manage"]).await;
    let (_, lead) = harness.user("lead@baladiya.test", "user", &["pilot_lead"]).await;
    let (_, deputy) = harness.user("deputy@baladiya.test", "user", &[]).await;
    let (_, admin) = harness.user("admin@baladiya.test", "admin", &[]).await;

    let Ok((status, Json(created))) = create_delegation_handler(
        State(harness.state.clone()),
        Extension(lead.clone()),
        Json(CreateDelegationRequest {
            delegatee_email: "deputy@baladiya.test".to_owned(),
            permissions: vec!["pilot_manage".to_owned()],
            end_date: None,
            reason: Some("annual leave".to_owned()),
        }),
    )
    .await
    else {
        panic!("delegation request should succeed");
    };
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.approval_status, "pending");
    assert!(!created.is_active);

    let before = harness.check(&deputy, "pilot_manage", None).await;
    assert!(matches!(before, Ok(response) if !response.has_permission));

    let by_deputy = approve_delegation_handler(
        State(harness.state.clone()),
        Extension(deputy.clone()),
        Json(DelegationApprovalRequest {
            delegation_id: created.delegation_id.clone(),
            approved: true,
        }),
    )
    .await;
    assert!(matches!(by_deputy, Err(ApiError(AppError::Forbidden(_)))));

    let Ok(Json(approval)) = approve_delegation_handler(
        State(harness.state.clone()),
        Extension(admin),
        Json(DelegationApprovalRequest {
            delegation_id: created.delegation_id,
            approved: true,
        }),
    )
    .await
    else {
        panic!("admin approval should succeed");
    };
    assert!(approval.success);
    assert!(approval.approved);

    let Ok(after) = harness.check(&deputy, "pilot_manage", None).await else {
        panic!("permission check should succeed");
    };
    assert!(after.has_permission);
    assert_eq!(after.source, "delegation");
}

#[tokio::test]
async fn approving_unknown_delegation_is_not_found() {
    let harness = Harness::new();
    let (_, admin) = harness.user("admin@baladiya.test", "admin", &[]).await;

    let result = approve_delegation_handler(
        State(harness.state.clone()),
        Extension(admin),
        Json(DelegationApprovalRequest {
            delegation_id: uuid::Uuid::new_v4().to_string(),
            approved: false,
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::NotFound(_)))));
}

#[tokio::test]
async fn delegation_list_rejects_unknown_status_filter() {
    let harness = Harness::new();
    let (_, admin) = harness.user("admin@baladiya.test", "admin", &[]).await;

    let result = list_delegations_handler(
        State(harness.state.clone()),
        Extension(admin),
        Query(DelegationListQuery {
            status: Some("sideways".to_owned()),
            ..DelegationListQuery::default()
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn field_filter_masks_fields_by_role() {
    let harness = Harness::new();
    let (_, clerk) = harness.user("clerk@baladiya.test", "user", &[]).await;
    let (_, finance) = harness
        .user("finance@baladiya.test", "user", &["finance_officer"])
        .await;

    let request = || FieldSecurityFilterRequest {
        entity_type: "pilot".to_owned(),
        fields: Vec::new(),
        data: json!({ "title": "Smart lighting", "budget": 120000, "risk_assessment": "low" }),
    };

    let Ok(Json(for_clerk)) = filter_fields_handler(
        State(harness.state.clone()),
        Extension(clerk),
        Json(request()),
    )
    .await
    else {
        panic!("filter should succeed");
    };
    let Ok(Json(for_finance)) = filter_fields_handler(
        State(harness.state.clone()),
        Extension(finance),
        Json(request()),
    )
    .await
    else {
        panic!("filter should succeed");
    };

    let mut clerk_masked = for_clerk.masked_fields.clone();
    clerk_masked.sort();
    assert_eq!(clerk_masked, vec!["budget", "risk_assessment"]);
    assert_eq!(for_clerk.filtered_data, json!({ "title": "Smart lighting" }));
    assert_eq!(for_finance.masked_fields, vec!["risk_assessment"]);
    assert_eq!(for_finance.filtered_data["budget"], json!(120000));
}

#[tokio::test]
async fn field_filter_rejects_unknown_entity_type() {
    let harness = Harness::new();
    let (_, clerk) = harness.user("clerk@baladiya.test", "user", &[]).await;

    let result = filter_fields_handler(
        State(harness.state.clone()),
        Extension(clerk),
        Json(FieldSecurityFilterRequest {
            entity_type: "spaceship".to_owned(),
            fields: Vec::new(),
            data: json!({}),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Validation(_)))));
}

#[tokio::test]
async fn gate_decisions_are_recorded_for_holders_of_the_gate_role() {
    let harness = Harness::new();
    let (_, clerk) = harness.user("clerk@baladiya.test", "user", &[]).await;
    let (_, manager) = harness
        .user("manager@baladiya.test", "user", &["pilot_manage"])
        .await;

    let Json(gates) = list_gates_handler(State(harness.state.clone())).await;
    assert!(
        gates
            .iter()
            .any(|gate| gate.entity_type == "pilot" && gate.gate_name == "approval")
    );

    let decision = |decision: &str| SubmitGateDecisionRequest {
        entity_type: "pilot".to_owned(),
        gate_name: "approval".to_owned(),
        entity_id: "pilot-42".to_owned(),
        decision: decision.to_owned(),
        comment: None,
    };

    let by_clerk = submit_gate_decision_handler(
        State(harness.state.clone()),
        Extension(clerk),
        Json(decision("approve")),
    )
    .await;
    assert!(matches!(by_clerk, Err(ApiError(AppError::Forbidden(_)))));

    let unknown = submit_gate_decision_handler(
        State(harness.state.clone()),
        Extension(manager.clone()),
        Json(decision("approve_with_bribe")),
    )
    .await;
    assert!(matches!(unknown, Err(ApiError(AppError::Validation(_)))));

    let Ok((status, Json(recorded))) = submit_gate_decision_handler(
        State(harness.state.clone()),
        Extension(manager.clone()),
        Json(decision("approve")),
    )
    .await
    else {
        panic!("gate decision should be recorded");
    };
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recorded.to_stage, "approved");

    let Ok(Json(history)) = list_gate_decisions_handler(
        State(harness.state.clone()),
        Extension(manager),
        Path(("pilot".to_owned(), "pilot-42".to_owned())),
    )
    .await
    else {
        panic!("decision history should load");
    };
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn security_administration_is_admin_only() {
    let harness = Harness::new();
    harness.role("idea_screener", &["idea_screen"]).await;
    let (clerk_user, clerk) = harness.user("clerk@baladiya.test", "user", &[]).await;
    let (_, admin) = harness.user("admin@baladiya.test", "admin", &[]).await;

    let by_clerk = list_roles_handler(State(harness.state.clone()), Extension(clerk)).await;
    assert!(matches!(by_clerk, Err(ApiError(AppError::Forbidden(_)))));

    let assigned = assign_role_handler(
        State(harness.state.clone()),
        Extension(admin.clone()),
        Json(RoleAssignmentRequest {
            user_id: clerk_user.user_id().to_string(),
            role_name: "idea_screener".to_owned(),
        }),
    )
    .await;
    assert!(matches!(assigned, Ok(StatusCode::NO_CONTENT)));

    let Ok(Json(users)) = list_users_handler(
        State(harness.state.clone()),
        Extension(admin),
        Query(PageQuery::default()),
    )
    .await
    else {
        panic!("admin should list users");
    };
    let clerk_row = users
        .iter()
        .find(|user| user.email == "clerk@baladiya.test");
    assert!(clerk_row.is_some_and(|row| row.assigned_roles == vec!["idea_screener"]));
}
