// error.rs - Error types for the REST gateway and client configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`GoalsApi`](crate::GoalsApi) calls and config loading.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, TLS...).
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("could not decode response from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },

    /// The HTTP client could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// An update was requested for a goal that has no id.
    #[error("goal has no id; create it before updating")]
    MissingId,

    #[error("could not read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ApiError {
    /// HTTP status for [`ApiError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
