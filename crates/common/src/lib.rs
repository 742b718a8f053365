// ================
// crates/common/src/lib.rs
// ================
//! Shared domain types for the Brushline client.
//! These are the shapes the secure core persists and the UI layer renders;
//! field naming follows the client's camelCase wire/storage convention.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Progress of the most recent authentication request
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Nothing in flight and nothing resolved yet
    #[default]
    Idle,
    /// A credential exchange is in flight
    Loading,
    /// The last credential exchange succeeded
    Success,
    /// The last credential exchange failed
    Failed,
}

/// Last-initiated session intent
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthTask {
    /// An explicit sign-out
    Logout,
    /// A read/restore of existing session state
    #[default]
    Read,
}

/// Token material returned by the credential exchange.
///
/// Every field is optional: the server contract has drifted over client
/// versions and older payloads carry the bearer token under `token`
/// instead of `accessToken`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenMaterial {
    /// Server response code bundled with the token payload
    pub code: Option<u32>,
    /// Token scheme, `Bearer` in practice
    pub token_type: Option<String>,
    /// The bearer token
    pub access_token: Option<String>,
    /// Legacy field name for the bearer token
    pub token: Option<String>,
    /// Id of the authenticated user
    pub user_id: Option<String>,
    /// Token lifetime in seconds, as reported by the server
    pub expires_in: Option<u64>,
    /// Opaque refresh token
    pub refresh_token: Option<String>,
}

impl TokenMaterial {
    /// The usable bearer token: `accessToken` first, then the legacy
    /// `token` field. Empty strings count as absent.
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.as_deref().filter(|t| !t.is_empty()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

/// Full customer profile attached to a logged-in session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    /// International dial code, e.g. `+961`
    pub phone_dial_code: String,
    pub phone_number: String,
    /// ISO country code the phone number belongs to
    pub phone_country: String,
    pub country: String,
    pub city: String,
    pub area: String,
    pub building: String,
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_info: Option<String>,
}

/// The observable authentication record.
///
/// Created with defaults at process start, mutated by login/logout/
/// hydration, and persisted (encrypted) whenever a mutation leaves the
/// session logged in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthState {
    pub status: AuthStatus,
    pub task: AuthTask,
    /// Recent error messages, bounded at persist time
    pub errors: Vec<String>,
    pub is_logged_in: bool,
    pub auth: Option<TokenMaterial>,
    pub user: Option<UserProfile>,
}

impl AuthState {
    /// The session's usable bearer token, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.auth.as_ref().and_then(TokenMaterial::bearer_token)
    }
}

/// A partial session snapshot, as returned by the persistence layer and
/// consumed by hydration. `None` fields leave the live state untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthStatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AuthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<AuthTask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_logged_in: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<TokenMaterial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl AuthStatePatch {
    /// True when the patch carries nothing, the "no prior session" answer.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Field-wise overlay onto a live state.
    pub fn apply_to(self, state: &mut AuthState) {
        if let Some(status) = self.status {
            state.status = status;
        }
        if let Some(task) = self.task {
            state.task = task;
        }
        if let Some(errors) = self.errors {
            state.errors = errors;
        }
        if let Some(is_logged_in) = self.is_logged_in {
            state.is_logged_in = is_logged_in;
        }
        if let Some(auth) = self.auth {
            state.auth = Some(auth);
        }
        if let Some(user) = self.user {
            state.user = Some(user);
        }
    }
}

impl From<AuthState> for AuthStatePatch {
    /// A fully-populated patch, used when a stored snapshot is restored
    /// wholesale.
    fn from(state: AuthState) -> Self {
        Self {
            status: Some(state.status),
            task: Some(state.task),
            errors: Some(state.errors),
            is_logged_in: Some(state.is_logged_in),
            auth: state.auth,
            user: state.user,
        }
    }
}
