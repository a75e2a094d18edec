//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from socket setup or file access.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The configured host and port do not resolve to a socket address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The configuration cannot drive a worker pool.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `start` was called on a server that is not stopped.
    #[error("Server is already running")]
    AlreadyRunning,

    /// A handler or middleware failed; reported to the client as a 500.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// Error from a typed view of the request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
