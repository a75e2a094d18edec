//! HTTP server implementation for microhttp-rs.
//!
//! [`HttpServer`] owns a listening socket and a fixed pool of worker threads that
//! poll it. Each accepted connection is read once, parsed, passed through the
//! middleware chain and the route table, answered, and closed.

mod response;
mod config;
mod error;
mod handler;
mod router;
mod middleware;
mod connection;
mod listener;
mod static_files;
mod simple;
mod http_server;
mod tests;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use handler::{HandlerFn, MiddlewareFn};
pub use router::RouteTable;
pub use middleware::MiddlewareChain;
pub use connection::{Dispatcher, INTERNAL_ERROR_BODY, NOT_FOUND_BODY, handle_connection};
pub use static_files::{FILE_NOT_FOUND_BODY, mime_type};
pub use simple::{SimpleHost, host, host_file, multihosts};
pub use http_server::{HttpServer, POLL_TIMEOUT, ServerState};
