//! Tracing subscriber initialization.
//!
//! Logs go to stderr so they never mix with rendered output on stdout.

use tracing_subscriber::EnvFilter;

/// Respects `RUST_LOG`; otherwise `warn`, or `debug` for the core crate with `--verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "warn,weather_core=debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
