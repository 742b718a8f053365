// ============================
// crates/secure-lib/src/auth/session.rs
// ============================
//! Session state machine over the encrypted store.
//!
//! Owns the in-memory [`AuthState`] and keeps the persisted copy in
//! step with it: every state-changing mutation either writes the
//! current state to the store (while logged in) or purges the stored
//! record (while logged out). Persistence failures inside mutations
//! are logged rather than surfaced, the in-memory state is already
//! updated and the user keeps working.
use brushline_common::{AuthState, AuthStatePatch, AuthStatus, AuthTask, TokenMaterial, UserProfile};
use metrics::counter;

use crate::error::SecureError;
use crate::metrics::{LOGIN_ACCEPTED, LOGIN_REJECTED, SESSION_HYDRATED, SESSION_PURGED};
use crate::storage::StorageBackend;
use crate::store::SecureStore;
use crate::token;

/// Logical store key holding the persisted session record.
pub const AUTH_STATE_KEY: &str = "authState";

/// Errors retained in the persisted copy once the list overflows.
const ERRORS_KEPT_ON_OVERFLOW: usize = 5;

/// Error count beyond which the persisted copy is truncated.
const MAX_PERSISTED_ERRORS: usize = 10;

/// Session state machine bound to a [`SecureStore`].
pub struct AuthStateStore<B> {
    state: AuthState,
    store: SecureStore<B>,
}

impl<B: StorageBackend> AuthStateStore<B> {
    /// Start with default (logged-out) state over `store`.
    pub fn new(store: SecureStore<B>) -> Self {
        Self {
            state: AuthState::default(),
            store,
        }
    }

    /// Read-only view of the current session state.
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Direct handle on the underlying store, for maintenance work
    /// that goes beyond the session record.
    pub fn store(&self) -> &SecureStore<B> {
        &self.store
    }

    /// Accept or reject a login based on the token material.
    ///
    /// A payload whose bearer token passes the structural check moves
    /// the session to `success`, replaces the token material, clears
    /// errors and any stale profile, and persists. A payload without a
    /// usable token moves the session to `failed` without touching the
    /// existing token material and without persisting. Returns whether
    /// the login was accepted.
    pub async fn login(&mut self, material: TokenMaterial) -> bool {
        let token_ok = material
            .bearer_token()
            .is_some_and(token::is_structurally_valid);

        if token_ok {
            self.state.status = AuthStatus::Success;
            self.state.auth = Some(material);
            self.state.is_logged_in = true;
            self.state.errors.clear();
            self.state.user = None;
            counter!(LOGIN_ACCEPTED).increment(1);
            self.persist_current().await;
            true
        } else {
            tracing::error!("invalid token received during login");
            self.state.status = AuthStatus::Failed;
            self.state.is_logged_in = false;
            counter!(LOGIN_REJECTED).increment(1);
            false
        }
    }

    /// Attach profile data to the session and persist.
    pub async fn set_user(&mut self, user: UserProfile) {
        self.state.user = Some(user);
        self.persist_current().await;
    }

    /// Flip the logged-in flag and persist. Dropping the flag purges
    /// the stored record, since persistence follows the flag.
    pub async fn set_is_logged_in(&mut self, is_logged_in: bool) {
        self.state.is_logged_in = is_logged_in;
        self.persist_current().await;
    }

    /// Log out: reset the session to its defaults (with `task` marking
    /// the logout) and purge the stored record.
    pub async fn clear_user(&mut self) {
        self.state.user = None;
        self.state.auth = None;
        self.state.is_logged_in = false;
        self.state.task = AuthTask::Logout;
        self.state.status = AuthStatus::Idle;
        self.state.errors.clear();
        self.purge().await;
        counter!(SESSION_PURGED).increment(1);
    }

    /// Merge a previously persisted snapshot into the current state.
    /// Meant to run once at startup, before anything else mutates the
    /// session.
    pub fn hydrate(&mut self, patch: AuthStatePatch) {
        if patch.is_empty() {
            return;
        }
        patch.apply_to(&mut self.state);
        counter!(SESSION_HYDRATED).increment(1);
    }

    /// Load the persisted session snapshot, if there is a usable one.
    ///
    /// Returns an empty patch when nothing is stored, when the stored
    /// record is not logged in, or when it has no access token. A
    /// stored token that fails the structural check purges the record
    /// and also yields an empty patch: a stale session downgrades to
    /// logged-out instead of being silently trusted.
    pub async fn load_persisted(&self) -> AuthStatePatch {
        let Some(stored) = self.store.get_item::<AuthState>(AUTH_STATE_KEY).await else {
            return AuthStatePatch::default();
        };

        let access_token = stored
            .auth
            .as_ref()
            .and_then(|auth| auth.access_token.as_deref())
            .filter(|token| !token.is_empty());

        if let Some(access_token) = access_token {
            if !token::is_structurally_valid(access_token) {
                tracing::warn!("invalid or expired token found, clearing stored session");
                self.purge().await;
                return AuthStatePatch::default();
            }
        }

        if stored.is_logged_in && access_token.is_some() {
            AuthStatePatch::from(stored)
        } else {
            AuthStatePatch::default()
        }
    }

    /// Write the current state to the store while logged in with an
    /// access token; purge the stored record otherwise.
    ///
    /// The persisted copy caps the error list so one bad afternoon
    /// cannot grow the stored blob without bound. Only encryption
    /// failures surface as errors; storage-level write failures are
    /// absorbed by the store.
    pub async fn persist(&self) -> Result<(), SecureError> {
        let has_access_token = self
            .state
            .auth
            .as_ref()
            .and_then(|auth| auth.access_token.as_deref())
            .is_some_and(|token| !token.is_empty());

        if self.state.is_logged_in && has_access_token {
            let mut snapshot = self.state.clone();
            if snapshot.errors.len() > MAX_PERSISTED_ERRORS {
                let keep_from = snapshot.errors.len() - ERRORS_KEPT_ON_OVERFLOW;
                snapshot.errors.drain(..keep_from);
            }
            self.store.set_item(AUTH_STATE_KEY, &snapshot).await
        } else {
            self.purge().await;
            Ok(())
        }
    }

    /// Remove the persisted session record.
    pub async fn purge(&self) {
        if let Err(err) = self.store.remove_item(AUTH_STATE_KEY).await {
            tracing::error!(error = %err, "failed to clear stored session");
        }
    }

    /// Append an error message to the session and persist. The
    /// in-memory list keeps everything; only the persisted copy is
    /// capped.
    pub async fn record_error(&mut self, message: String) {
        self.state.errors.push(message);
        self.persist_current().await;
    }

    /// Persist and swallow the failure; mutations keep working even
    /// when the store does not.
    async fn persist_current(&self) {
        if let Err(err) = self.persist().await {
            tracing::error!(error = %err, "failed to persist auth state");
        }
    }
}
