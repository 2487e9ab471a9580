// src/logging.rs
// =============================================================================
// Log output for the whole program.
//
// All progress and per-page failures go through `tracing` and end up on
// stderr, so stdout stays clean for the final report (and for --json).
// The level is controlled with RUST_LOG, e.g. RUST_LOG=site_mirror=debug.
// =============================================================================

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
