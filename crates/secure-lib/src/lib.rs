// ============================
// crates/secure-lib/src/lib.rs
// ============================
//! Core security functionality for the Brushline ordering client:
//! encrypted local session storage, token shape checks, input
//! sanitization and login throttling.

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod store;
pub mod token;
pub mod validation;

use std::time::Duration;

use crate::auth::{AuthStateStore, LoginRateLimiter, OtpIssuer};
use crate::config::Settings;
use crate::crypto::CipherCodec;
use crate::error::SecureError;
use crate::storage::StorageBackend;
use crate::store::SecureStore;

/// Everything the application needs to run the security subsystem,
/// wired together over one storage backend.
pub struct SecureCore<B> {
    /// Resolved settings
    pub settings: Settings,
    /// Session state machine over the encrypted store
    pub session: AuthStateStore<B>,
    /// Login attempt throttle
    pub login_limiter: LoginRateLimiter,
    /// One-time passcode issuer
    pub otp: OtpIssuer,
}

impl<B: StorageBackend> SecureCore<B> {
    /// Build the security core over `backend`.
    ///
    /// Validates the settings, derives the cipher key and assembles
    /// the store, session and limiter. Fails when the settings are
    /// unusable or no encryption key can be resolved.
    pub fn new(backend: B, settings: Settings) -> Result<Self, SecureError> {
        settings.validate()?;
        let passphrase = settings.resolve_encryption_key()?;
        let codec = CipherCodec::new(&passphrase)?;
        let store = SecureStore::new(backend, codec);
        let session = AuthStateStore::new(store);
        let login_limiter = LoginRateLimiter::new(
            settings.rate_limit.max_attempts,
            Duration::from_secs(settings.rate_limit.window_secs),
        );

        Ok(Self {
            settings,
            session,
            login_limiter,
            otp: OtpIssuer::default(),
        })
    }

    /// Restore a prior session from storage. Meant to run once at
    /// startup, before the first read of the session state.
    pub async fn bootstrap(&mut self) {
        let patch = self.session.load_persisted().await;
        self.session.hydrate(patch);
    }
}
