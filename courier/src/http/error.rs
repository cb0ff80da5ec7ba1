//! Front-end error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    /// Failed to bind to the configured address
    #[error("Failed to bind HTTP server to {address}: {source}")]
    BindError {
        address: String,
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    ServerError(String),
}
