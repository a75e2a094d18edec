//! HTTP request handlers and middleware.

use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::{Error, HttpResponse};

/// A route handler: fills in the response for a matched request.
///
/// An `Err` is turned into a `500 Internal Server Error` by the connection pipeline.
pub type HandlerFn = Arc<dyn Fn(&HttpRequest, &mut HttpResponse) -> Result<(), Error> + Send + Sync>;

/// A middleware step run before route resolution.
///
/// `Ok(true)` continues the chain, `Ok(false)` stops it and sends the response as it
/// stands. No error body is added on a stop.
pub type MiddlewareFn = Arc<dyn Fn(&HttpRequest, &mut HttpResponse) -> Result<bool, Error> + Send + Sync>;
