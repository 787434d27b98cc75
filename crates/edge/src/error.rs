// crates/edge/src/error.rs

use adapt::Error as AdaptError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;
use serve::Error as ServeError;
use std::io;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("adapt error: {0}")]
    AdaptError(#[from] AdaptError),

    #[error("serve error: {0}")]
    ServeError(#[from] ServeError),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("background task failed: {0}")]
    Join(#[from] JoinError),

    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::ServeError(e) => e.to_status(),
            Error::AdaptError(AdaptError::ServeError(e)) => e.to_status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.to_status();
        if status.is_server_error() {
            error!("request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(Error::NotFound("x".into()).to_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::ServeError(ServeError::NotFound("x".into())).to_status(),
            StatusCode::NOT_FOUND
        );
        let asset = ServeError::Asset {
            path: "a.svg".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(
            Error::ServeError(asset).to_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Config("bad".into()).to_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
