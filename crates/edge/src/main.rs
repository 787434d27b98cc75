// crates/edge/src/main.rs

use std::process::ExitCode;

use edge::{cli, logging};
use tracing::info;

fn main() -> ExitCode {
    logging::init();
    info!(
        "trellis {} starting (log filter from {} or RUST_LOG)",
        env!("CARGO_PKG_VERSION"),
        logging::LOG_ENV
    );
    cli::start()
}
