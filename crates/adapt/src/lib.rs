// crates/adapt/src/lib.rs

//! Collaborators behind the `serve` traits: the on-disk content store, the
//! media library that produces crops and placeholders, and the in-memory
//! API cache.

pub mod cache;
pub mod media;
pub mod store;

use serve::Error as ServeError;
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serve error: {0}")]
    ServeError(#[from] ServeError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("content root {0:?} is not a directory")]
    NotADirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
