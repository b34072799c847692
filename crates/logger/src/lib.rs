//! Subscriber setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str =
    "info,remote_client=info,domain_access=info,derived_state=info,hello_keys=info";

/// Builds the filter from `RUST_LOG`, or `fallback` when it is unset or invalid.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Installs the global fmt subscriber. Logs go to stderr so stdout stays
/// free for command output. Calling it twice is harmless.
pub fn init() {
    init_with(DEFAULT_FILTER);
}

pub fn init_with(fallback: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if installed.is_ok() {
        tracing::debug!("Logger initialised");
    }
}
