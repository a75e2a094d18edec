//! A minimal embeddable HTTP server.
//!
//! This library parses HTTP/1.x requests, dispatches them through a middleware
//! chain and a route table, and serves them from a small fixed pool of worker
//! threads that share one listening socket.
//!
//! # Features
//!
//! - Permissive request parsing from a single read (never fails)
//! - Exact routes with ordered wildcard (`*`) fallback
//! - Short-circuiting middleware
//! - Static file serving with a fixed MIME table
//! - Handler errors and panics mapped to `500 Internal Server Error`
//! - A separate "serve one page forever" mode ([`host`], [`host_file`], [`multihosts`])
//!
//! One connection carries one request: there is no keep-alive, chunked encoding,
//! TLS or HTTP/2.
//!
//! # Examples
//!
//! ## Parsing
//!
//! ```
//! use microhttp_rs::parse_request;
//!
//! let request = parse_request(b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n");
//! assert_eq!(request.method, "GET");
//! assert_eq!(request.path, "/search");
//! assert_eq!(request.get_query_param("q"), Some("rust"));
//! assert_eq!(request.get_header("Host"), Some("example.com"));
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use microhttp_rs::{HttpServer, ServerConfig};
//!
//! let mut server = HttpServer::new(ServerConfig {
//!     port: 8090,
//!     thread_pool_size: 2,
//!     ..ServerConfig::default()
//! });
//!
//! server
//!     .use_middleware(|req, _res| Ok(!req.path.starts_with("/private")))
//!     .route("/", |_req, res| {
//!         res.set_body("<h1>Hello, World!</h1>");
//!         Ok(())
//!     })
//!     .static_files("/static", "./public");
//!
//! server.start()?;
//! // ... serve traffic ...
//! server.stop();
//! # Ok::<(), microhttp_rs::ServerError>(())
//! ```
//!
//! ## Limitations
//!
//! - The request is read with one `read` call of at most `buffer_size - 1` bytes;
//!   a request that arrives in pieces or exceeds the buffer is parsed as truncated.
//! - Static files are resolved without path-traversal checks.
//! - The listener uses `poll(2)`, so the crate targets Unix platforms.

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{
    Error as ServerError, HttpResponse, HttpServer, ServerConfig, ServerState, StatusCode,
    host, host_file, multihosts,
};
