pub mod attrs;
pub mod block;
pub mod cache;
pub mod ctx;
pub mod global;
pub mod index;
pub mod layout;
pub mod link;
pub mod media;
pub mod page;
pub mod sitemap;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

use http::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unreadable asset {path}: {source}")]
    Asset {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("other serve error: {0}")]
    Other(String),
}

impl Error {
    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
