//! Error types for the HTTP adapters

use council_application::{DirectoryError, TransportError};
use thiserror::Error;

/// Errors that can occur when talking to the discussion backend over HTTP
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl HttpError {
    /// Classify a reqwest error for `url`.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            HttpError::Timeout(url.to_string())
        } else if source.is_decode() {
            HttpError::Decode(source.to_string())
        } else {
            HttpError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

impl From<HttpError> for TransportError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Timeout(_) => TransportError::Timeout,
            HttpError::Status { status, message } => TransportError::Status { status, message },
            HttpError::Decode(reason) => TransportError::Decode(reason),
            other => TransportError::Connection(other.to_string()),
        }
    }
}

impl From<HttpError> for DirectoryError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Status { status, message } => DirectoryError::Status { status, message },
            HttpError::Decode(reason) => DirectoryError::Decode(reason),
            other => DirectoryError::Unavailable(other.to_string()),
        }
    }
}
