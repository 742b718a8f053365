// ==============
// crates/secure-lib/src/metrics.rs

//! Central place for metric keys
pub const LOGIN_ACCEPTED: &str = "auth.login.accepted";
pub const LOGIN_REJECTED: &str = "auth.login.rejected";
pub const LOGIN_RATE_LIMITED: &str = "auth.login.rate_limited";
pub const SESSION_HYDRATED: &str = "auth.session.hydrated";
pub const SESSION_PURGED: &str = "auth.session.purged";
pub const DECRYPT_FAILED: &str = "secure_store.decrypt_failed";
pub const STORE_WRITE_FAILED: &str = "secure_store.write_failed";
