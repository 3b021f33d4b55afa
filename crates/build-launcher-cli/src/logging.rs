//! Console logging for the launcher.
//!
//! Diagnostics go to stderr so stdout carries only the banner and plans.
//! Verbosity follows `RUST_LOG` (default: `warn`).

use tracing_subscriber::EnvFilter;

pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
