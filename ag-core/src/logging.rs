//! Process-wide `tracing` subscriber installation, shared by every binary
//! in the workspace.

use tracing_subscriber::EnvFilter;

/// Install a `tracing-subscriber` formatter driven by `RUST_LOG` (default
/// `info`). Safe to call once per process; subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
