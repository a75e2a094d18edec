//! Per-connection pipeline: read, parse, middleware, route, respond.

use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};

use log::{debug, error, info, warn};

use crate::parser::{HttpRequest, parse_request};
use crate::server::middleware::MiddlewareChain;
use crate::server::router::RouteTable;
use crate::server::{Error, HttpResponse, StatusCode};

/// Body sent when no route matches.
pub const NOT_FOUND_BODY: &str = "<h1>404 Not Found</h1>";
/// Body sent when a handler or middleware fails.
pub const INTERNAL_ERROR_BODY: &str = "<h1>500 Internal Server Error</h1>";

/// Routes and middleware frozen at server start, shared read-only by all workers.
#[derive(Clone, Default)]
pub struct Dispatcher {
    pub routes: RouteTable,
    pub middleware: MiddlewareChain,
    pub verbose: bool,
}

impl Dispatcher {
    /// Run middleware, then the matching route, against a fresh response.
    pub fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let mut response = HttpResponse::default();

        if !self.middleware.run(request, &mut response)? {
            return Ok(response);
        }

        match self.routes.resolve(&request.path) {
            Some(handler) => handler(request, &mut response)?,
            None => {
                response.set_status(StatusCode::NotFound);
                response.set_body(NOT_FOUND_BODY);
            }
        }

        Ok(response)
    }

    /// Parse and dispatch, converting failures and panics into a 500 response.
    pub fn respond(&self, raw: &[u8]) -> HttpResponse {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let request = parse_request(raw);
            if self.verbose {
                info!("{} {}", request.method, request.path);
            } else {
                debug!("{} {}", request.method, request.path);
            }
            self.dispatch(&request)
        }));

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!("Error processing request: {e}");
                internal_error()
            }
            Err(_) => {
                error!("Error processing request: handler panicked");
                internal_error()
            }
        }
    }
}

fn internal_error() -> HttpResponse {
    HttpResponse::new(StatusCode::InternalServerError).with_body_string(INTERNAL_ERROR_BODY)
}

/// Handle a single connection.
///
/// Reads at most `buffer_size - 1` bytes once. An empty or failed read closes the
/// connection without a response; otherwise exactly one response is written. The
/// stream is closed when the caller drops it.
pub fn handle_connection(
    stream: &mut (impl Read + Write),
    dispatcher: &Dispatcher,
    buffer_size: usize,
) -> Result<(), Error> {
    let mut buf = vec![0; buffer_size.saturating_sub(1).max(1)];

    let n = match stream.read(&mut buf) {
        Ok(0) => return Ok(()),
        Ok(n) => n,
        Err(e) => {
            warn!("Failed to read request: {e}");
            return Ok(());
        }
    };

    let response = dispatcher.respond(&buf[..n]);
    stream.write_all(&response.to_bytes())?;
    stream.flush()?;
    Ok(())
}
