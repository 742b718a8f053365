// ============================
// crates/secure-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod otp;
pub mod rate_limit;
pub mod session;
pub mod token_generator;

pub use otp::{OtpError, OtpIssuer};
pub use rate_limit::LoginRateLimiter;
pub use session::{AuthStateStore, AUTH_STATE_KEY};
pub use token_generator::generate_secure_id;
