// ============================
// crates/secure-lib/src/token.rs
// ============================
//! Structural bearer-token checks.
//!
//! This module never verifies a cryptographic signature. It checks
//! that a token is shaped like a JWT, carries subject and issued-at
//! claims, and is not expired (with a clock-skew buffer). That makes
//! it a cheap local filter for obviously unusable tokens and nothing
//! more: a token passing these checks says nothing about who minted
//! it. Authorization decisions belong to the server, which must verify
//! the signature on every request.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;

/// Clock-skew buffer applied to the expiry claim. A token expiring
/// within the next five minutes is already treated as expired.
pub const EXPIRY_SKEW_MS: i64 = 300_000;

/// Check whether `token` has a usable bearer-token shape.
///
/// Returns `false` for anything that is not three dot-separated
/// segments with a base64url JSON payload carrying a non-empty `sub`
/// and a non-zero integer `iat`. An `exp` claim, when present, must sit
/// at least [`EXPIRY_SKEW_MS`] past the current wall clock.
pub fn is_structurally_valid(token: &str) -> bool {
    is_structurally_valid_at(token, Utc::now().timestamp_millis())
}

fn is_structurally_valid_at(token: &str, now_ms: i64) -> bool {
    if token.is_empty() {
        return false;
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return false;
    }

    let payload_bytes = match URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let payload: serde_json::Value = match serde_json::from_slice(&payload_bytes) {
        Ok(value) => value,
        Err(_) => return false,
    };

    // Expiry in seconds since epoch, with a 5-minute skew buffer.
    if let Some(exp) = payload.get("exp").and_then(|claim| claim.as_i64()) {
        if exp.saturating_mul(1000) < now_ms + EXPIRY_SKEW_MS {
            return false;
        }
    }

    let has_subject = payload
        .get("sub")
        .and_then(|claim| claim.as_str())
        .is_some_and(|sub| !sub.is_empty());
    let has_issued_at = payload
        .get("iat")
        .and_then(|claim| claim.as_i64())
        .is_some_and(|iat| iat != 0);

    has_subject && has_issued_at
}
