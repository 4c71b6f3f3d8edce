// ==============
// crates/auth-lib/src/metrics.rs

//! Central place for metric keys.
//!
//! Counters go through the `metrics` facade; they are no-ops until the
//! embedding application installs a recorder.
use metrics::counter;

pub const REGISTER_SUCCESS: &str = "auth.register.success";
pub const REGISTER_CONFLICT: &str = "auth.register.conflict";
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILURE: &str = "auth.login.failure";
pub const SESSION_CREATED: &str = "auth.session.created";
pub const SESSION_TOKEN_COLLISION: &str = "auth.session.token_collision";

/// Increment a counter by one
pub fn increment(key: &'static str) {
    counter!(key).increment(1);
}
