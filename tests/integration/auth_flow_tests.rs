// ==============================
// tests/integration/auth_flow_tests.rs
// ==============================
//! End-to-end session flows: login, persistence, restore and logout.
use std::sync::LazyLock;

use brushline_common::{AuthState, AuthStatePatch, AuthStatus, AuthTask};
use brushline_secure_lib::auth::{AuthStateStore, AUTH_STATE_KEY};
use brushline_secure_lib::config::Settings;
use brushline_secure_lib::crypto::CipherCodec;
use brushline_secure_lib::storage::{FlatFileBackend, MemoryBackend, StorageBackend};
use brushline_secure_lib::store::{SecureStore, STORAGE_PREFIX};
use brushline_secure_lib::SecureCore;

use crate::test_utils::{fresh_token, sample_profile, stale_token, token_material};

static CODEC: LazyLock<CipherCodec> =
    LazyLock::new(|| CipherCodec::new("auth-flow-test-passphrase").expect("codec"));

/// A session store over a shared in-memory backend, plus a handle on
/// that backend for raw inspection.
fn setup() -> (AuthStateStore<MemoryBackend>, MemoryBackend) {
    let backend = MemoryBackend::new();
    let store = SecureStore::new(backend.clone(), CODEC.clone());
    (AuthStateStore::new(store), backend)
}

/// A second session store over the same backend, the way a process
/// restart would create one.
fn reopen(backend: &MemoryBackend) -> AuthStateStore<MemoryBackend> {
    AuthStateStore::new(SecureStore::new(backend.clone(), CODEC.clone()))
}

fn namespaced_session_key() -> String {
    format!("{STORAGE_PREFIX}{AUTH_STATE_KEY}")
}

#[tokio::test]
async fn test_login_persists_and_restores_across_restart() {
    let (mut session, backend) = setup();

    let token = fresh_token("user-1001");
    assert!(session.login(token_material(&token)).await);
    assert_eq!(session.state().status, AuthStatus::Success);
    assert!(session.state().is_logged_in);
    assert_eq!(session.state().bearer_token(), Some(token.as_str()));

    // Simulate a restart: a fresh session over the same backend
    let mut restarted = reopen(&backend);
    let patch = restarted.load_persisted().await;
    assert!(!patch.is_empty());

    restarted.hydrate(patch);
    assert_eq!(restarted.state().status, AuthStatus::Success);
    assert!(restarted.state().is_logged_in);
    assert_eq!(restarted.state().bearer_token(), Some(token.as_str()));
}

#[tokio::test]
async fn test_rejected_login_touches_nothing_but_status() {
    let (mut session, backend) = setup();

    // A good login first, so there is state worth preserving
    let good = fresh_token("user-1001");
    assert!(session.login(token_material(&good)).await);
    session.set_user(sample_profile()).await;

    // A rejected login flips status and the flag but leaves the old
    // token material, the profile and the stored record alone
    let before_auth = session.state().auth.clone();
    assert!(!session.login(token_material(&stale_token("user-1001"))).await);
    assert_eq!(session.state().status, AuthStatus::Failed);
    assert!(!session.state().is_logged_in);
    assert_eq!(session.state().auth, before_auth);
    assert_eq!(session.state().user, Some(sample_profile()));

    // The stored record still reflects the earlier successful login
    let restored = reopen(&backend).load_persisted().await;
    assert_eq!(restored.is_logged_in, Some(true));
    assert_eq!(restored.auth.and_then(|auth| auth.access_token), Some(good));
}

#[tokio::test]
async fn test_rejected_login_on_fresh_session_persists_nothing() {
    let (mut session, backend) = setup();

    assert!(!session.login(token_material(&stale_token("user-1001"))).await);
    assert_eq!(session.state().status, AuthStatus::Failed);
    assert!(!session.state().is_logged_in);

    // Nothing reached the backend
    assert!(backend.is_empty());
}

#[tokio::test]
async fn test_logout_purges_the_stored_record() {
    let (mut session, backend) = setup();

    assert!(session.login(token_material(&fresh_token("user-1001"))).await);
    assert!(!backend.is_empty());

    session.clear_user().await;

    // In-memory state is reset, with the logout marker set
    assert_eq!(session.state().status, AuthStatus::Idle);
    assert_eq!(session.state().task, AuthTask::Logout);
    assert!(!session.state().is_logged_in);
    assert_eq!(session.state().auth, None);

    // The stored record is gone and a restart sees no session
    assert_eq!(backend.get_item(&namespaced_session_key()).await.unwrap(), None);
    assert!(reopen(&backend).load_persisted().await.is_empty());
}

#[tokio::test]
async fn test_stale_stored_session_is_purged_on_load() {
    let (session, backend) = setup();

    // Seed storage with a logged-in record whose token has expired,
    // bypassing the login path's own validation
    let stored = AuthState {
        status: AuthStatus::Success,
        is_logged_in: true,
        auth: Some(token_material(&stale_token("user-1001"))),
        ..AuthState::default()
    };
    session
        .store()
        .set_item(AUTH_STATE_KEY, &stored)
        .await
        .unwrap();

    // The load both reports "no session" and deletes the bad record
    assert!(session.load_persisted().await.is_empty());
    assert_eq!(backend.get_item(&namespaced_session_key()).await.unwrap(), None);
}

#[tokio::test]
async fn test_logged_out_record_is_ignored_but_not_purged() {
    let (session, backend) = setup();

    let stored = AuthState {
        is_logged_in: false,
        auth: Some(token_material(&fresh_token("user-1001"))),
        ..AuthState::default()
    };
    session
        .store()
        .set_item(AUTH_STATE_KEY, &stored)
        .await
        .unwrap();

    // A valid token on a logged-out record yields no session, and the
    // record is left in place
    assert!(session.load_persisted().await.is_empty());
    assert!(backend
        .get_item(&namespaced_session_key())
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_legacy_token_field_does_not_restore_a_session() {
    let (session, _backend) = setup();

    // The restore path keys off accessToken specifically; a record
    // carrying the bearer token only under the legacy field is treated
    // as sessionless
    let mut material = token_material("");
    material.access_token = None;
    material.token = Some(fresh_token("user-1001"));

    let stored = AuthState {
        status: AuthStatus::Success,
        is_logged_in: true,
        auth: Some(material),
        ..AuthState::default()
    };
    session
        .store()
        .set_item(AUTH_STATE_KEY, &stored)
        .await
        .unwrap();

    assert!(session.load_persisted().await.is_empty());
}

#[tokio::test]
async fn test_persisted_errors_are_capped() {
    let (mut session, backend) = setup();

    assert!(session.login(token_material(&fresh_token("user-1001"))).await);
    for i in 0..12 {
        session.record_error(format!("request failed ({i})")).await;
    }

    // The live list keeps everything
    assert_eq!(session.state().errors.len(), 12);

    // The persisted copy was truncated to the most recent five
    let restored = reopen(&backend).load_persisted().await;
    let errors = restored.errors.expect("persisted errors");
    assert_eq!(errors.len(), 5);
    assert_eq!(errors[0], "request failed (7)");
    assert_eq!(errors[4], "request failed (11)");
}

#[tokio::test]
async fn test_profile_updates_are_persisted() {
    let (mut session, backend) = setup();

    assert!(session.login(token_material(&fresh_token("user-1001"))).await);
    session.set_user(sample_profile()).await;

    let restored = reopen(&backend).load_persisted().await;
    assert_eq!(restored.user, Some(sample_profile()));
}

#[tokio::test]
async fn test_dropping_the_login_flag_purges_storage() {
    let (mut session, backend) = setup();

    assert!(session.login(token_material(&fresh_token("user-1001"))).await);
    session.set_is_logged_in(false).await;

    assert_eq!(backend.get_item(&namespaced_session_key()).await.unwrap(), None);
    assert!(reopen(&backend).load_persisted().await.is_empty());
}

#[tokio::test]
async fn test_hydrate_overlays_only_present_fields() {
    let (mut session, _backend) = setup();

    let patch = AuthStatePatch {
        status: Some(AuthStatus::Success),
        is_logged_in: Some(true),
        ..AuthStatePatch::default()
    };
    session.hydrate(patch);

    assert_eq!(session.state().status, AuthStatus::Success);
    assert!(session.state().is_logged_in);
    // Untouched fields keep their defaults
    assert_eq!(session.state().task, AuthTask::Read);
    assert_eq!(session.state().auth, None);
}

#[tokio::test]
async fn test_core_bootstrap_restores_prior_session() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        encryption_key: Some("integration-test-key".to_string()),
        ..Settings::default()
    };

    // First run: log in and let the core persist the session
    let backend = FlatFileBackend::new(&settings.data_dir).unwrap();
    let mut core = SecureCore::new(backend, settings.clone()).unwrap();
    let token = fresh_token("user-1001");
    assert!(core.session.login(token_material(&token)).await);

    // Second run over the same directory picks the session back up
    let backend = FlatFileBackend::new(&settings.data_dir).unwrap();
    let mut core = SecureCore::new(backend, settings).unwrap();
    core.bootstrap().await;
    assert!(core.session.state().is_logged_in);
    assert_eq!(core.session.state().bearer_token(), Some(token.as_str()));
}
