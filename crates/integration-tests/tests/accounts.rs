//! Account and session flows through the app state.

#![allow(clippy::unwrap_used)]

use homeservice_app::models::NewAccount;
use homeservice_app::services::AccountError;
use homeservice_core::{NormalizedEmail, hash_password};
use homeservice_integration_tests::TestContext;

// =============================================================================
// Registration & Sign-in
// =============================================================================

#[tokio::test]
async fn test_register_then_lookup_ignores_case() {
    let ctx = TestContext::new().await;
    let profile = ctx
        .state
        .register(NewAccount::new("User", "USER@Example.com", "555-0100", "pw"))
        .await;

    let record = ctx.state.lookup("user@example.com").await.unwrap();
    assert_eq!(record.normalized_email.as_str(), "user@example.com");
    assert_eq!(record.profile, profile);
    assert_eq!(record.credential().as_str(), hash_password("pw"));
}

#[tokio::test]
async fn test_register_logout_sign_in_roundtrip() {
    let ctx = TestContext::new().await;
    let registered = ctx
        .state
        .register(NewAccount::new("Ada", "ada@example.com", "", "right"))
        .await;
    ctx.state.log_out().await;
    assert!(ctx.state.current_user().await.is_none());

    assert!(ctx.state.sign_in("ada@example.com", "wrong").await.is_none());
    assert!(!ctx.state.validate_credentials("ada@example.com", "wrong").await);
    assert!(ctx.state.current_user().await.is_none());

    let signed_in = ctx.state.sign_in("ada@example.com", "right").await.unwrap();
    assert_eq!(signed_in, registered);
    assert_eq!(ctx.state.current_user().await.unwrap(), registered);
}

#[tokio::test]
async fn test_register_same_email_replaces_account() {
    let ctx = TestContext::new().await;
    ctx.state
        .register(NewAccount::new("First", "a@x.com", "", "one"))
        .await;
    ctx.state
        .register(NewAccount::new("Second", "A@X.com", "", "two"))
        .await;

    assert_eq!(ctx.state.snapshot().account_count, 1);
    let record = ctx.state.lookup("a@x.com").await.unwrap();
    assert_eq!(record.profile.name, "Second");
    assert!(ctx.state.validate_credentials("a@x.com", "two").await);
}

// =============================================================================
// Profile & Email Changes
// =============================================================================

#[tokio::test]
async fn test_email_change_onto_taken_address_changes_nothing() {
    let ctx = TestContext::new().await;
    ctx.state
        .register(NewAccount::new("Bob", "bob@x.com", "1", "bob-pw"))
        .await;
    ctx.state
        .register(NewAccount::new("Ada", "ada@x.com", "2", "ada-pw"))
        .await;

    let err = ctx
        .state
        .update_email_and_password("ada@x.com", "Bob@X.com", Some("stolen"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::DuplicateEmail(NormalizedEmail::new("bob@x.com"))
    );

    let bob = ctx.state.lookup("bob@x.com").await.unwrap();
    let ada = ctx.state.lookup("ada@x.com").await.unwrap();
    assert_eq!(bob.profile.name, "Bob");
    assert_eq!(ada.profile.name, "Ada");
    assert!(ctx.state.validate_credentials("bob@x.com", "bob-pw").await);
    assert!(ctx.state.validate_credentials("ada@x.com", "ada-pw").await);
    assert_eq!(
        ctx.state.current_user().await.unwrap().email.as_str(),
        "ada@x.com"
    );
}

#[tokio::test]
async fn test_email_change_moves_account_and_session() {
    let ctx = TestContext::new().await;
    ctx.state
        .register(NewAccount::new("Ada", "ada@x.com", "", "pw"))
        .await;

    ctx.state
        .update_email_and_password("ada@x.com", "Ada.L@X.com", None)
        .await
        .unwrap();

    assert!(ctx.state.lookup("ada@x.com").await.is_none());
    assert!(ctx.state.validate_credentials("ada.l@x.com", "pw").await);
    assert_eq!(
        ctx.state.current_user().await.unwrap().email.as_str(),
        "ada.l@x.com"
    );

    let ctx = ctx.restart().await;
    assert_eq!(
        ctx.state.current_user().await.unwrap().email.as_str(),
        "ada.l@x.com"
    );
}

#[tokio::test]
async fn test_unknown_account_updates_are_ignored() {
    let ctx = TestContext::new().await;
    ctx.state.update_profile("ghost@x.com", "Ghost", "0").await;
    ctx.state
        .update_email_and_password("ghost@x.com", "spirit@x.com", Some("pw"))
        .await
        .unwrap();

    assert!(ctx.state.lookup("ghost@x.com").await.is_none());
    assert!(ctx.state.lookup("spirit@x.com").await.is_none());
    assert_eq!(ctx.state.snapshot().account_count, 0);
}

#[tokio::test]
async fn test_profile_update_of_other_account_leaves_session() {
    let ctx = TestContext::new().await;
    ctx.state
        .register(NewAccount::new("Bob", "bob@x.com", "1", "pw"))
        .await;
    ctx.state
        .register(NewAccount::new("Ada", "ada@x.com", "2", "pw"))
        .await;

    ctx.state.update_profile("bob@x.com", "Robert", "9").await;

    assert_eq!(ctx.state.current_user().await.unwrap().name, "Ada");
    assert_eq!(
        ctx.state.lookup("bob@x.com").await.unwrap().profile.name,
        "Robert"
    );
}
