// ============================
// crates/secure-lib/src/auth/otp.rs
// ============================
//! One-time passcode issuing and verification.
//!
//! A single pending code at a time, tied to the phone number that
//! requested it. The issued code is returned to the caller for
//! delivery; this module does not talk to any SMS or email gateway.
use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;

/// How long an issued code stays valid (5 minutes)
const DEFAULT_OTP_TTL: Duration = Duration::from_secs(5 * 60);

/// Why a code failed verification
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpError {
    #[error("no verification code has been requested")]
    NoPending,

    #[error("the verification code has expired")]
    Expired,

    #[error("phone number does not match the pending request")]
    PhoneMismatch,

    #[error("the verification code is incorrect")]
    CodeMismatch,
}

struct PendingOtp {
    phone: String,
    email: Option<String>,
    code: String,
    expires_at: Instant,
}

/// Issues six-digit codes and verifies them against the pending
/// request. Issuing a new code replaces any outstanding one.
pub struct OtpIssuer {
    pending: Option<PendingOtp>,
    ttl: Duration,
}

impl Default for OtpIssuer {
    fn default() -> Self {
        Self::new(DEFAULT_OTP_TTL)
    }
}

impl OtpIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self { pending: None, ttl }
    }

    /// Issue a fresh six-digit code for `phone`, replacing any pending
    /// one, and return it for delivery.
    pub fn issue(&mut self, phone: &str, email: Option<&str>) -> String {
        let code = rand::thread_rng().gen_range(100_000..1_000_000u32).to_string();
        self.pending = Some(PendingOtp {
            phone: phone.to_string(),
            email: email.map(str::to_string),
            code: code.clone(),
            expires_at: Instant::now() + self.ttl,
        });
        code
    }

    /// Email address attached to the pending request, if any.
    pub fn pending_email(&self) -> Option<&str> {
        self.pending.as_ref().and_then(|pending| pending.email.as_deref())
    }

    /// Verify `code` for `phone` against the pending request.
    ///
    /// Expiry clears the pending code: the caller has to request a new
    /// one. A phone or code mismatch keeps it pending, so a typo does
    /// not invalidate a code still in flight.
    pub fn verify(&mut self, phone: &str, code: &str) -> Result<(), OtpError> {
        let Some(pending) = self.pending.take() else {
            return Err(OtpError::NoPending);
        };

        if Instant::now() > pending.expires_at {
            return Err(OtpError::Expired);
        }

        if pending.phone != phone {
            self.pending = Some(pending);
            return Err(OtpError::PhoneMismatch);
        }

        if pending.code != code {
            self.pending = Some(pending);
            return Err(OtpError::CodeMismatch);
        }

        // Consumed on success
        Ok(())
    }

    /// Drop any pending code, e.g. when the user logs out.
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
