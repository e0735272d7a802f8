//! OU resolution over a small organization tree.

mod common;

use account_lifecycle::error::ResolutionError;
use account_lifecycle::organizations::{account_id_for_email, build_ou_cache, format_nested};
use common::*;

#[tokio::test]
async fn test_cache_holds_every_ou_breadth_first() {
    let world = TestWorld::new();
    let retry = world.retry();

    let cache = build_ou_cache(world.orgs.as_ref(), &retry).await.unwrap();

    let ids: Vec<&str> = cache.all_ous().iter().map(|ou| ou.id.as_str()).collect();
    assert_eq!(ids, vec![SECURITY_OU, SANDBOX_OU, WORKLOADS_OU, NESTED_SANDBOX_OU]);
    assert_eq!(cache.root().id, ROOT_ID);
}

#[tokio::test]
async fn test_cache_is_built_once_per_context() {
    let world = TestWorld::new();
    let context = world.context().await;
    let calls_after_bootstrap = world.orgs.call_count("list_organizational_units_for_parent");

    let resolver = context.resolver();
    assert!(resolver.resolve("Security").is_some());
    assert!(resolver.resolve("Workloads").is_some());

    assert_eq!(
        world.orgs.call_count("list_organizational_units_for_parent"),
        calls_after_bootstrap
    );
}

#[tokio::test]
async fn test_nested_reference_picks_the_exact_ou() {
    let world = TestWorld::new();
    let context = world.context().await;

    let nested = format_nested("Sandbox", NESTED_SANDBOX_OU);
    let ou = context.resolver().resolve(&nested).unwrap();

    assert_eq!(ou.id, NESTED_SANDBOX_OU);
    assert_eq!(ou.parent_id.as_deref(), Some(WORKLOADS_OU));
}

#[tokio::test]
async fn test_nested_reference_with_wrong_name_does_not_resolve() {
    let world = TestWorld::new();
    let context = world.context().await;

    let nested = format_nested("Production", NESTED_SANDBOX_OU);
    assert!(context.resolver().resolve(&nested).is_none());
}

// Plain names shared by several OUs resolve to the first one met breadth-first.
#[tokio::test]
async fn test_ambiguous_plain_name_takes_first_match() {
    let world = TestWorld::new();
    let context = world.context().await;

    let ou = context.resolver().resolve("Sandbox").unwrap();
    assert_eq!(ou.id, SANDBOX_OU);
}

#[tokio::test]
async fn test_accounts_in_root_and_named_ous() {
    let world = TestWorld::new();
    world
        .orgs
        .add_account("444444444444", "Team-A", "a@example.com", NESTED_SANDBOX_OU);
    let context = world.context().await;

    let in_root = context
        .resolver()
        .account_ids_in_ous(&["Root".to_string()])
        .await
        .unwrap();
    assert_eq!(in_root, vec![CT_MANAGEMENT_ID]);

    let in_security_and_nested = context
        .resolver()
        .account_ids_in_ous(&[
            "Security".to_string(),
            format_nested("Sandbox", NESTED_SANDBOX_OU),
            "Nonexistent".to_string(),
        ])
        .await
        .unwrap();
    assert_eq!(
        in_security_and_nested,
        vec![LOG_ARCHIVE_ID, AUDIT_ID, "444444444444"]
    );
}

#[tokio::test]
async fn test_mismatched_nested_reference_denotes_no_ou() {
    let world = TestWorld::new();
    world
        .orgs
        .add_account("444444444444", "Team-A", "a@example.com", SANDBOX_OU);
    let context = world.context().await;
    let resolver = context.resolver();
    let reference = format_nested("Workloads", SANDBOX_OU);

    assert!(resolver.resolve(&reference).is_none());
    assert!(resolver
        .account_ids_in_ous(&[reference.clone()])
        .await
        .unwrap()
        .is_empty());
    assert!(!resolver.account_in_ou(&reference, "444444444444").await.unwrap());
    assert!(resolver
        .account_in_ou(&format_nested("Sandbox", SANDBOX_OU), "444444444444")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_ou_for_account_reports_root_by_reserved_name() {
    let world = TestWorld::new();
    let context = world.context().await;

    let ou = context.resolver().ou_for_account(CT_MANAGEMENT_ID).await.unwrap();
    assert_eq!(ou.name, "Root");
    assert_eq!(ou.id, ROOT_ID);
    assert!(ou.parent_id.is_none());

    let ou = context.resolver().ou_for_account(AUDIT_ID).await.unwrap();
    assert_eq!(ou.id, SECURITY_OU);
}

#[tokio::test]
async fn test_account_membership() {
    let world = TestWorld::new();
    world
        .orgs
        .add_account("444444444444", "Team-A", "a@example.com", NESTED_SANDBOX_OU);
    let context = world.context().await;
    let resolver = context.resolver();

    assert!(resolver.account_in_ou("Root", CT_MANAGEMENT_ID).await.unwrap());
    assert!(!resolver.account_in_ou("Root", AUDIT_ID).await.unwrap());
    assert!(resolver.account_in_ou("Security", AUDIT_ID).await.unwrap());
    assert!(!resolver.account_in_ou("Security", CT_MANAGEMENT_ID).await.unwrap());

    // Plain names compare by name, nested references resolve to one OU
    assert!(resolver.account_in_ou("Sandbox", "444444444444").await.unwrap());
    assert!(resolver
        .account_in_ou(&format_nested("Sandbox", NESTED_SANDBOX_OU), "444444444444")
        .await
        .unwrap());
    assert!(!resolver
        .account_in_ou(&format_nested("Sandbox", SANDBOX_OU), "444444444444")
        .await
        .unwrap());

    assert!(!resolver.account_in_ou("Security", "999999999999").await.unwrap());
}

#[tokio::test]
async fn test_account_lookup_by_email() {
    let world = TestWorld::new();
    let retry = world.retry();

    let id = account_id_for_email(world.orgs.as_ref(), &retry, "AUDIT@example.com")
        .await
        .unwrap();
    assert_eq!(id, AUDIT_ID);

    let missing = account_id_for_email(world.orgs.as_ref(), &retry, "nobody@example.com").await;
    assert!(matches!(missing, Err(ResolutionError::AccountNotFound { .. })));
}

#[tokio::test]
async fn test_throttled_traversal_recovers() {
    let world = TestWorld::new();
    world
        .orgs
        .throttle_next("list_organizational_units_for_parent", 2);
    let retry = world.retry();

    let cache = build_ou_cache(world.orgs.as_ref(), &retry).await.unwrap();

    assert_eq!(cache.len(), 4);
    assert_eq!(world.sleeper.recorded().len(), 2);
}
