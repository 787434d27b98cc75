// crates/edge/src/logging.rs

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Env var read before `RUST_LOG`, so the server can be tuned without
/// touching other tools' logging.
pub const LOG_ENV: &str = "TRELLIS_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Pick the filter directive: `TRELLIS_LOG`, then `RUST_LOG`, then `warn`.
/// Blank values count as unset.
pub fn directive(trellis_log: Option<String>, rust_log: Option<String>) -> String {
    [trellis_log, rust_log]
        .into_iter()
        .flatten()
        .map(|d| d.trim().to_owned())
        .find(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_owned())
}

/// Install the global subscriber: env filter plus a fmt layer with source
/// locations.
pub fn init() {
    let wanted = directive(std::env::var(LOG_ENV).ok(), std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&wanted).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)); // fallback

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_file(true).with_line_number(true))
        .init();
}
