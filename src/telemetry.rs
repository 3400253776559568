//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! LOG_LEVEL sets the filter, either a bare level ("debug") or full
//! directives ("info,question=debug,session=debug"). LOG_FORMAT switches
//! between human-readable output (default) and "json" for log shippers.
//! Targets, files and line numbers are included so normalization fallbacks
//! can be traced back to the exact call site.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str =
    "info,question=debug,quiz=debug,session=debug,score=debug,quiz_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // The two formats have different layer types, so init inside the match.
    if matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}
