//! Logging initialization for every entry point.
//!
//! Library code only emits `tracing` events. On desktop and iOS they go through a
//! `tracing_subscriber` fmt layer filtered by `RUST_LOG`; on Android `tracing`
//! forwards to `log` (no subscriber is installed) and `android_logger` writes to
//! logcat.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging with sensible defaults. Safe to call more than once; only
/// the first call has an effect.
pub fn setup_logging() {
    INIT.call_once(init);
}

#[cfg(target_os = "android")]
fn init() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("gpx_handoff"),
    );
    log::info!("Logging initialized (logcat)");
}

#[cfg(not(target_os = "android"))]
fn init() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    // Logs go to stderr: stdout belongs to the host's channel output
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_filter(filter);
    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        tracing::debug!("Global subscriber already set; keeping it");
        return;
    }

    tracing::info!("Logging initialized");
}
