// ============================
// crates/secure-lib/src/auth/rate_limit.rs
// ============================
//! Rate limiting for login attempts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use metrics::counter;

use crate::metrics::LOGIN_RATE_LIMITED;

/// Default number of attempts allowed inside one window
const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Default window length (15 minutes)
const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Sliding-window login throttle keyed by identifier.
///
/// State is in-memory only and dies with the process. That is an
/// accepted limitation: this throttle slows down interactive retry
/// loops on a single device, it is not a durable or distributed
/// rate limit.
#[derive(Debug, Clone)]
pub struct LoginRateLimiter {
    /// Attempt timestamps per identifier
    attempts: Arc<DashMap<String, Vec<Instant>>>,
    /// Attempts allowed inside one window
    max_attempts: usize,
    /// Trailing window length
    window: Duration,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW)
    }
}

impl LoginRateLimiter {
    /// Create a new login rate limiter
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            window,
        }
    }

    /// Check whether `identifier` may attempt a login right now.
    ///
    /// Attempts older than the window are evicted lazily on this call.
    /// A rejected call records nothing, so hammering a locked
    /// identifier does not push the unlock time further out.
    pub fn can_proceed(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.attempts.entry(identifier.to_string()).or_default();

        entry.retain(|attempt| now.duration_since(*attempt) < self.window);

        if entry.len() >= self.max_attempts {
            counter!(LOGIN_RATE_LIMITED).increment(1);
            tracing::warn!(identifier, "login attempts rate limited");
            return false;
        }

        entry.push(now);
        true
    }

    /// Forget all recorded attempts for `identifier`, typically after
    /// a successful authentication.
    pub fn reset(&self, identifier: &str) {
        self.attempts.remove(identifier);
    }
}
