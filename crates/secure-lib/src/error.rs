// crates/secure-lib/src/error.rs

//! Central error type with error codes and sanitized messages.
use thiserror::Error;

/// Library error types with error codes and context
#[derive(Error, Debug)]
pub enum SecureError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication rate limit exceeded")]
    RateLimited,
}

impl SecureError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SecureError::Config(_) => "CFG_001",
            SecureError::Encryption(_) => "CRYPT_001",
            SecureError::Storage(_) => "STORE_001",
            SecureError::Io(_) => "IO_001",
            SecureError::Json(_) => "JSON_001",
            SecureError::RateLimited => "RATE_001",
        }
    }

    /// Get a sanitized message suitable for surfacing to end users.
    ///
    /// Detailed context stays in logs; nothing here may leak key
    /// material, file paths, or stored payloads.
    pub fn sanitized_message(&self) -> String {
        match self {
            SecureError::Config(_) => "Service is misconfigured".to_string(),
            SecureError::Encryption(_) => "Could not protect stored data".to_string(),
            SecureError::Storage(_) => "Could not access secure storage".to_string(),
            SecureError::Io(_) => "Could not access secure storage".to_string(),
            SecureError::Json(_) => "Stored data was not in the expected format".to_string(),
            SecureError::RateLimited => {
                "Too many login attempts, please try again later".to_string()
            },
        }
    }
}

impl From<String> for SecureError {
    fn from(msg: String) -> Self {
        SecureError::Storage(msg)
    }
}

impl From<&str> for SecureError {
    fn from(msg: &str) -> Self {
        SecureError::Storage(msg.to_string())
    }
}
