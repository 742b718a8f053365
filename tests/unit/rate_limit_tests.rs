// ==============================
// tests/unit/rate_limit_tests.rs
// ==============================
//! This test suite is designed to validate the functionality of the `LoginRateLimiter`
use brushline_secure_lib::auth::LoginRateLimiter;
use std::thread;
use std::time::Duration;

#[test]
fn test_limiter_allows_initial_attempts() {
    let limiter = LoginRateLimiter::default();

    // First attempt should be allowed
    assert!(limiter.can_proceed("+96170100001"));
}

#[test]
fn test_limiter_blocks_after_max_attempts() {
    let limiter = LoginRateLimiter::default();

    // Use up the default budget of 5 attempts
    for _ in 0..5 {
        assert!(limiter.can_proceed("+96170100002"));
    }

    // The sixth attempt inside the window is refused
    assert!(!limiter.can_proceed("+96170100002"));
}

#[test]
fn test_window_slides_past_old_attempts() {
    let limiter = LoginRateLimiter::new(3, Duration::from_millis(200));

    for _ in 0..3 {
        assert!(limiter.can_proceed("+96170100003"));
    }
    assert!(!limiter.can_proceed("+96170100003"));

    // Wait for the recorded attempts to age out of the window
    thread::sleep(Duration::from_millis(250));
    assert!(limiter.can_proceed("+96170100003"));
}

#[test]
fn test_refused_attempts_are_not_recorded() {
    let limiter = LoginRateLimiter::new(2, Duration::from_millis(600));

    // One attempt now, one halfway through the window
    assert!(limiter.can_proceed("+96170100004"));
    thread::sleep(Duration::from_millis(300));
    assert!(limiter.can_proceed("+96170100004"));

    // The budget is spent; this refusal must not count as an attempt
    assert!(!limiter.can_proceed("+96170100004"));

    // Once the first attempt expires only the second one remains, so a
    // new attempt fits. Had the refusal above been recorded, the
    // identifier would still be at its limit here.
    thread::sleep(Duration::from_millis(400));
    assert!(limiter.can_proceed("+96170100004"));
}

#[test]
fn test_identifiers_tracked_separately() {
    let limiter = LoginRateLimiter::default();

    // Exhaust one caller
    for _ in 0..5 {
        limiter.can_proceed("+96170100005");
    }
    assert!(!limiter.can_proceed("+96170100005"));

    // A different caller is unaffected
    assert!(limiter.can_proceed("+96170100006"));
}

#[test]
fn test_reset_clears_recorded_attempts() {
    let limiter = LoginRateLimiter::default();

    for _ in 0..5 {
        limiter.can_proceed("+96170100007");
    }
    assert!(!limiter.can_proceed("+96170100007"));

    // A successful login wipes the counter
    limiter.reset("+96170100007");
    assert!(limiter.can_proceed("+96170100007"));
}
