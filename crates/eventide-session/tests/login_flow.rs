//! Integration tests for the login, sign-up, and logout flows.

use eventide_protocol::SourceKind;
use eventide_session::login::{self, DEV_ADMIN_UID, DEV_USER_UID};
use eventide_session::{
    AccessDecision, AuthBackend, AuthError, InMemoryAuthBackend, LoginConfig, LoginOutcome,
    SessionError, SessionStore, StoreConfig, admin_access,
};
use eventide_storage::{KeyValueStore, MemoryStore};

struct Harness {
    storage: MemoryStore,
    store: SessionStore<MemoryStore>,
    backend: InMemoryAuthBackend,
    config: LoginConfig,
}

fn harness() -> Harness {
    let storage = MemoryStore::new();
    let store = SessionStore::new(storage.clone(), StoreConfig::default());
    let backend = InMemoryAuthBackend::default();
    store.mount(&backend).unwrap();
    Harness {
        storage,
        store,
        backend,
        config: LoginConfig::default(),
    }
}

#[tokio::test]
async fn test_log_in_dev_admin_injects_admin_override() {
    let h = harness();
    let outcome = login::log_in(
        &h.store,
        &h.backend,
        &h.config,
        "devadmin@eventide.com",
        "devpassword",
    )
    .await
    .unwrap();

    assert!(matches!(outcome, LoginOutcome::Override(ref r) if r.is_admin));
    let snap = h.store.snapshot();
    assert_eq!(snap.session.identity().unwrap().id.as_str(), DEV_ADMIN_UID);
    assert_eq!(snap.session.source(), SourceKind::Override);
    assert_eq!(admin_access(&snap), AccessDecision::Granted);
    assert!(h.storage.get("eventide-mock-auth").unwrap().is_some());
    // The backend was never involved.
    assert!(h.backend.current_user().is_none());
}

#[tokio::test]
async fn test_log_in_dev_user_is_not_admin() {
    let h = harness();
    login::log_in(&h.store, &h.backend, &h.config, "devuser@eventide.com", "devpassword")
        .await
        .unwrap();

    let snap = h.store.snapshot();
    assert_eq!(snap.session.identity().unwrap().id.as_str(), DEV_USER_UID);
    assert_eq!(admin_access(&snap), AccessDecision::Denied);
}

#[tokio::test]
async fn test_log_in_real_account_goes_live() {
    let h = harness();
    h.backend.add_account("carol@example.com", "hunter22", Some("Carol")).unwrap();

    let outcome = login::log_in(&h.store, &h.backend, &h.config, "carol@example.com", "hunter22")
        .await
        .unwrap();

    let LoginOutcome::Live(user) = outcome else {
        panic!("expected a live login");
    };
    assert_eq!(h.store.get_session().identity(), Some(&user.identity));
    assert_eq!(h.store.get_session().source(), SourceKind::Live);
}

#[tokio::test]
async fn test_log_in_after_dev_login_replaces_override() {
    let h = harness();
    h.backend.add_account("carol@example.com", "hunter22", None).unwrap();
    login::log_in(&h.store, &h.backend, &h.config, "devadmin@eventide.com", "devpassword")
        .await
        .unwrap();

    login::log_in(&h.store, &h.backend, &h.config, "carol@example.com", "hunter22")
        .await
        .unwrap();

    assert_eq!(h.store.get_session().source(), SourceKind::Live);
    assert!(!h.store.get_session().is_admin());
    assert!(h.storage.get("eventide-mock-auth").unwrap().is_none());
}

#[tokio::test]
async fn test_log_in_bad_password_is_auth_error() {
    let h = harness();
    h.backend.add_account("carol@example.com", "hunter22", None).unwrap();

    let result = login::log_in(&h.store, &h.backend, &h.config, "carol@example.com", "wrong").await;

    assert!(matches!(
        result,
        Err(SessionError::Auth(AuthError::InvalidCredentials))
    ));
    assert!(h.store.get_session().identity().is_none());
}

#[tokio::test]
async fn test_log_in_rejects_malformed_input() {
    let h = harness();
    assert!(matches!(
        login::log_in(&h.store, &h.backend, &h.config, "nope", "x").await,
        Err(SessionError::InvalidInput(_))
    ));
    assert!(matches!(
        login::log_in(&h.store, &h.backend, &h.config, "a@b.com", "").await,
        Err(SessionError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_dev_logins_disabled_fall_through_to_backend() {
    let h = harness();
    let config = LoginConfig {
        enable_dev_logins: false,
        ..Default::default()
    };
    let result =
        login::log_in(&h.store, &h.backend, &config, "devadmin@eventide.com", "devpassword").await;
    assert!(matches!(
        result,
        Err(SessionError::Auth(AuthError::InvalidCredentials))
    ));
}

#[tokio::test]
async fn test_sign_up_signs_in_through_live_path() {
    let h = harness();
    let user = login::sign_up(&h.backend, "dave@example.com", "longenough", Some("  Dave "))
        .await
        .unwrap();

    assert_eq!(user.identity.display_name.as_deref(), Some("Dave"));
    assert_eq!(h.store.get_session().identity(), Some(&user.identity));
}

#[tokio::test]
async fn test_sign_up_short_password_is_rejected_by_backend() {
    let h = harness();
    assert!(matches!(
        login::sign_up(&h.backend, "dave@example.com", "123", None).await,
        Err(SessionError::Auth(AuthError::WeakPassword(6)))
    ));
}

#[tokio::test]
async fn test_log_out_clears_override_and_live() {
    let h = harness();
    login::log_in(&h.store, &h.backend, &h.config, "devadmin@eventide.com", "devpassword")
        .await
        .unwrap();

    login::log_out(&h.store, &h.backend).await.unwrap();

    let snap = h.store.snapshot();
    assert_eq!(snap.session.source(), SourceKind::None);
    assert_eq!(admin_access(&snap), AccessDecision::RedirectToLogin);
    assert!(h.storage.get("eventide-mock-auth").unwrap().is_none());
}

#[tokio::test]
async fn test_log_out_with_offline_backend_still_clears_locally() {
    let h = harness();
    login::log_in(&h.store, &h.backend, &h.config, "devuser@eventide.com", "devpassword")
        .await
        .unwrap();
    h.backend.set_offline(true);

    let result = login::log_out(&h.store, &h.backend).await;

    assert!(matches!(result, Err(SessionError::Auth(AuthError::Network(_)))));
    assert_eq!(h.store.get_session().source(), SourceKind::None);
}

#[tokio::test]
async fn test_backend_sign_out_alone_keeps_dev_override() {
    // The backend's own sign-out can't end a dev session; only log_out does.
    let h = harness();
    login::log_in(&h.store, &h.backend, &h.config, "devadmin@eventide.com", "devpassword")
        .await
        .unwrap();

    h.backend.sign_out().await.unwrap();

    assert_eq!(h.store.get_session().source(), SourceKind::Override);
}
