//! Error types for the layout compiler and its collaborators

use thiserror::Error;

/// Result type alias for gridpage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling, storing or serving pages
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-correctable input problem (missing resolution, bad payload, bad id)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The layout grid cannot be turned into geometry
    #[error("Malformed layout: {0}")]
    MalformedLayout(String),

    /// The persistence backend failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// No page stored under the requested id
    #[error("Page not found: {0}")]
    NotFound(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failure in the HTTP layer itself
    #[error("Server error: {0}")]
    ServerError(String),
}

impl Error {
    /// HTTP status code used when this error is reported to a client.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) | Error::MalformedLayout(_) => 400,
            Error::NotFound(_) => 404,
            Error::StorageError(_) | Error::ConfigError(_) | Error::ServerError(_) => 500,
        }
    }

    /// Whether the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
