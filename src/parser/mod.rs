//! HTTP parser module.
//!
//! Turns the bytes of a single socket read into an [`HttpRequest`]. The parser is
//! permissive: it never fails, and malformed input degrades to empty or partial fields.

mod request;
mod method;
mod version;
mod error;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

// Re-export the parse_request function
pub use request::parse_request;
