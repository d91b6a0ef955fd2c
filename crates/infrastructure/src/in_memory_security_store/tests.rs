use std::collections::BTreeSet;

use chrono::{Duration, Utc};

use baladiya_application::{
    DelegationQuery, DelegationRepository, DelegationRevision, RoleRepository, UserListQuery,
    UserRepository,
};
use baladiya_core::AppError;
use baladiya_domain::{
    ApprovalStatus, DelegationRule, EmailAddress, Permission, RoleDefinition, RoleName, User,
    UserId,
};

use super::InMemorySecurityStore;

fn email(value: &str) -> EmailAddress {
    EmailAddress::new(value).unwrap_or_else(|_| unreachable!())
}

fn role_name(value: &str) -> RoleName {
    RoleName::new(value).unwrap_or_else(|_| unreachable!())
}

fn new_user(address: &str) -> User {
    User::new(
        UserId::new(),
        email(address),
        address,
        role_name("user"),
        BTreeSet::new(),
        Utc::now(),
    )
}

#[tokio::test]
async fn users_are_unique_by_email_and_listed_in_email_order() {
    let store = InMemorySecurityStore::new();
    assert!(store.create_user(&new_user("zaid@baladiya.test")).await.is_ok());
    assert!(store.create_user(&new_user("amal@baladiya.test")).await.is_ok());

    let duplicate = store.create_user(&new_user("amal@baladiya.test")).await;
    let listed = store
        .list_users(UserListQuery {
            limit: 10,
            offset: 0,
        })
        .await
        .unwrap_or_default();

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    assert_eq!(
        listed
            .iter()
            .map(|user| user.email().as_str())
            .collect::<Vec<_>>(),
        vec!["amal@baladiya.test", "zaid@baladiya.test"]
    );
}

#[tokio::test]
async fn concurrent_role_assignments_are_all_kept() {
    let store = InMemorySecurityStore::new();
    let user = new_user("huda@baladiya.test");
    assert!(store.create_user(&user).await.is_ok());
    let pilot = role_name("pilot_manager");
    let screener = role_name("idea_screener");

    let (first, second) = tokio::join!(
        store.add_assigned_role(user.user_id(), &pilot),
        store.add_assigned_role(user.user_id(), &screener),
    );
    let repeated = store.add_assigned_role(user.user_id(), &pilot).await;
    let removed = store.remove_assigned_role(user.user_id(), &screener).await;
    let absent = store.remove_assigned_role(user.user_id(), &screener).await;
    let missing = store.add_assigned_role(UserId::new(), &pilot).await;

    assert!(first.is_ok() && second.is_ok());
    assert!(matches!(repeated, Err(AppError::Conflict(_))));
    assert!(removed.is_ok());
    assert!(matches!(absent, Err(AppError::NotFound(_))));
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    let stored = store.find_by_id(user.user_id()).await.unwrap_or_default();
    assert_eq!(
        stored.map(|stored| stored.assigned_roles().clone()),
        Some(BTreeSet::from([pilot]))
    );
}

#[tokio::test]
async fn role_lookup_by_names_skips_unknown_roles() {
    let store = InMemorySecurityStore::new();
    let role = RoleDefinition::new(
        role_name("pilot_manager"),
        Permission::parse_set(["pilot_manage"]).unwrap_or_default(),
    );
    assert!(store.save_role(&role).await.is_ok());

    let loaded = store
        .list_roles_by_names(&[role_name("pilot_manager"), role_name("ghost")])
        .await
        .unwrap_or_default();

    assert_eq!(loaded, vec![role]);
}

#[tokio::test]
async fn only_approved_active_rules_are_listed_for_the_resolver() {
    let store = InMemorySecurityStore::new();
    let delegatee = email("alice@baladiya.test");
    let mut approved = DelegationRule::request(
        email("bob@baladiya.test"),
        delegatee.clone(),
        Permission::parse_set(["rd_manage"]).unwrap_or_default(),
        Some(Utc::now() + Duration::days(1)),
        None,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    let pending = DelegationRule::request(
        email("carol@baladiya.test"),
        delegatee.clone(),
        Permission::parse_set(["rd_manage"]).unwrap_or_default(),
        None,
        None,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());

    assert!(store.create_delegation(&approved).await.is_ok());
    assert!(store.create_delegation(&pending).await.is_ok());
    let expected = DelegationRevision::of(&approved);
    assert!(approved.decide(true, "admin", Utc::now()).is_ok());
    assert!(store.update_delegation(&approved, expected).await.is_ok());

    let active = store
        .list_active_for_delegatee(&delegatee)
        .await
        .unwrap_or_default();
    let pending_only = store
        .list_delegations(&DelegationQuery {
            delegatee_email: Some(delegatee),
            delegator_email: None,
            participant_email: None,
            approval_status: Some(ApprovalStatus::Pending),
            limit: 10,
            offset: 0,
        })
        .await
        .unwrap_or_default();

    assert_eq!(active.len(), 1);
    assert_eq!(active[0].delegation_id(), approved.delegation_id());
    assert_eq!(pending_only.len(), 1);
    assert_eq!(pending_only[0].delegation_id(), pending.delegation_id());
}

#[tokio::test]
async fn stale_delegation_update_is_a_conflict() {
    let store = InMemorySecurityStore::new();
    let rule = DelegationRule::request(
        email("bob@baladiya.test"),
        email("alice@baladiya.test"),
        Permission::parse_set(["pilot_manage"]).unwrap_or_default(),
        None,
        None,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(store.create_delegation(&rule).await.is_ok());
    let pending = DelegationRevision::of(&rule);

    let mut approved = rule.clone();
    let mut rejected = rule.clone();
    assert!(approved.decide(true, "admin", Utc::now()).is_ok());
    assert!(rejected.decide(false, "admin", Utc::now()).is_ok());

    assert!(store.update_delegation(&approved, pending).await.is_ok());
    let stale = store.update_delegation(&rejected, pending).await;
    let missing = store
        .update_delegation(
            &DelegationRule::request(
                email("carol@baladiya.test"),
                email("alice@baladiya.test"),
                Permission::parse_set(["pilot_manage"]).unwrap_or_default(),
                None,
                None,
                Utc::now(),
            )
            .unwrap_or_else(|_| unreachable!()),
            pending,
        )
        .await;

    assert!(matches!(stale, Err(AppError::Conflict(_))));
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    let stored = store
        .find_delegation(rule.delegation_id())
        .await
        .unwrap_or_default();
    assert_eq!(
        stored.map(|stored| stored.approval_status()),
        Some(ApprovalStatus::Approved)
    );
}
