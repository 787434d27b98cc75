// crates/edge/src/lib.rs

pub mod cli;
mod error;
pub mod logging;
pub mod router;
pub mod watch;

pub use error::{Error, Result};
