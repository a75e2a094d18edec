//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors produced by the typed accessors of a parsed request.
///
/// Parsing itself never fails; a malformed request simply yields empty fields.
/// These errors surface only when a caller asks for a typed view of a token.
#[derive(Debug, Error)]
pub enum Error {
    /// The method token is not one of the supported HTTP methods.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The version token is not a supported HTTP version.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A required header is missing from the request.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// Error parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
