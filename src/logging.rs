use dogmail_core::utils::debug::default_log_directive;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `verbose` and
/// `DOGMAIL_DEBUG`; calling it twice is harmless.
pub fn init_logging(verbose: bool) {
    let directive = if verbose { "debug" } else { default_log_directive() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
