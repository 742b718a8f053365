// ============================
// crates/secure-lib/src/config.rs
// ============================
//! Configuration management.
use std::path::{Path, PathBuf};

use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::SecureError;

/// Passphrase used when no encryption key is configured. Only ever
/// honoured in debug builds; release builds refuse to start without a
/// real key.
pub const FALLBACK_DEV_KEY: &str = "fallback-key-for-dev-only";

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the encrypted flat files
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Passphrase for the storage cipher, normally supplied via
    /// `BRUSHLINE_ENCRYPTION_KEY` rather than a config file
    pub encryption_key: Option<String>,
    /// Login throttling knobs
    pub rate_limit: RateLimitSettings,
}

/// Login rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Attempts allowed inside one window
    pub max_attempts: usize,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            encryption_key: None,
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 15 * 60, // 15 minutes
        }
    }
}

impl Settings {
    /// Reject settings that would misbehave at runtime.
    pub fn validate(&self) -> Result<(), SecureError> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            return Err(SecureError::Config(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        if self.rate_limit.max_attempts == 0 {
            return Err(SecureError::Config(
                "rate_limit.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(SecureError::Config(
                "rate_limit.window_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the cipher passphrase.
    ///
    /// Falls back to [`FALLBACK_DEV_KEY`] in debug builds so local
    /// development works out of the box. Release builds treat a missing
    /// key as a configuration error.
    pub fn resolve_encryption_key(&self) -> Result<Zeroizing<String>, SecureError> {
        if let Some(key) = self.encryption_key.as_deref() {
            if !key.is_empty() {
                return Ok(Zeroizing::new(key.to_string()));
            }
        }
        if cfg!(debug_assertions) {
            tracing::warn!("no encryption key configured, using development fallback");
            Ok(Zeroizing::new(FALLBACK_DEV_KEY.to_string()))
        } else {
            Err(SecureError::Config(
                "encryption key must be configured in release builds".to_string(),
            ))
        }
    }
}

/// Load settings from various sources
pub fn load_settings() -> Result<Settings> {
    // Config files first, then environment variables on top
    let settings = Figment::new()
        .merge(Toml::file("config.toml"))
        .merge(Yaml::file("config.yaml"))
        .merge(Json::file("config.json"))
        .merge(Env::prefixed("BRUSHLINE_"))
        .extract()?;

    Ok(settings)
}

/// Load settings from an explicit TOML file, still letting the
/// environment override individual values.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let settings = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("BRUSHLINE_"))
        .extract()?;

    Ok(settings)
}
