//! Debug switch for DogMail
//!
//! # Environment Variables
//!
//! - `DOGMAIL_DEBUG=1` - Raise the default log level to `debug`

use std::sync::OnceLock;

/// Cached debug enabled state (checked once at startup)
static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if debug mode is enabled via `DOGMAIL_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| parse_debug_flag(std::env::var("DOGMAIL_DEBUG").ok().as_deref()))
}

fn parse_debug_flag(value: Option<&str>) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub fn default_log_directive() -> &'static str {
    if is_debug_enabled() {
        "debug"
    } else {
        "info"
    }
}
