//! Ordered, short-circuiting middleware chain.

use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::handler::MiddlewareFn;
use crate::server::{Error, HttpResponse};

/// Middleware steps run in registration order before route resolution.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    steps: Vec<MiddlewareFn>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step to the end of the chain.
    pub fn push<F>(&mut self, middleware: F)
    where
        F: Fn(&HttpRequest, &mut HttpResponse) -> Result<bool, Error> + Send + Sync + 'static,
    {
        let middleware: MiddlewareFn = Arc::new(middleware);
        self.steps.push(middleware);
    }

    /// Run every step against the shared response.
    ///
    /// Returns `Ok(false)` as soon as a step stops the chain; later steps and the
    /// route handler must then be skipped. An error from a step ends the chain too.
    pub fn run(&self, request: &HttpRequest, response: &mut HttpResponse) -> Result<bool, Error> {
        for step in &self.steps {
            if !step(request, response)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::server::StatusCode;

    #[test]
    fn test_empty_chain_continues() {
        let chain = MiddlewareChain::new();
        assert!(chain.is_empty());
        let mut response = HttpResponse::default();
        assert!(chain.run(&HttpRequest::default(), &mut response).unwrap());
    }

    #[test]
    fn test_steps_run_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        for name in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            chain.push(move |_req, _res| {
                order.lock().unwrap().push(name);
                Ok(true)
            });
        }

        assert_eq!(chain.len(), 3);
        assert!(!chain.is_empty());

        let mut response = HttpResponse::default();
        assert!(chain.run(&HttpRequest::default(), &mut response).unwrap());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_short_circuit_skips_later_steps() {
        let later = Arc::new(AtomicUsize::new(0));
        let mut chain = MiddlewareChain::new();
        chain.push(|_req, res| {
            res.set_status(StatusCode::Forbidden);
            res.set_body("blocked");
            Ok(false)
        });
        let counter = Arc::clone(&later);
        chain.push(move |_req, _res| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        });

        let mut response = HttpResponse::default();
        assert!(!chain.run(&HttpRequest::default(), &mut response).unwrap());
        assert_eq!(later.load(Ordering::SeqCst), 0);
        assert_eq!(response.status_code, 403);
        assert_eq!(response.body, b"blocked");
    }

    #[test]
    fn test_error_stops_chain() {
        let mut chain = MiddlewareChain::new();
        chain.push(|_req, _res| {
            Err(Error::InternalError("auth backend down".to_string()))
        });

        let mut response = HttpResponse::default();
        let result = chain.run(&HttpRequest::default(), &mut response);
        assert!(matches!(result, Err(Error::InternalError(_))));
    }
}
