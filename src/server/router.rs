//! Route table with exact lookup and ordered wildcard fallback.

use std::collections::HashMap;
use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::handler::HandlerFn;
use crate::server::{Error, HttpResponse};

/// Maps path patterns to handlers.
///
/// A pattern containing `*` or `:` is a wildcard pattern; it matches any path that
/// starts with the text before its first `*` (the whole pattern when it has no `*`).
/// Resolution tries an exact match first, then scans wildcard patterns in
/// registration order and takes the first one whose prefix matches.
#[derive(Clone, Default)]
pub struct RouteTable {
    exact: HashMap<String, usize>,
    entries: Vec<(String, HandlerFn)>,
}

impl RouteTable {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `pattern`.
    ///
    /// Registering the same pattern again replaces its handler but keeps its
    /// first position in the wildcard scan.
    pub fn add_route<F>(&mut self, pattern: impl Into<String>, handler: F)
    where
        F: Fn(&HttpRequest, &mut HttpResponse) -> Result<(), Error> + Send + Sync + 'static,
    {
        let pattern = pattern.into();
        let handler: HandlerFn = Arc::new(handler);
        match self.exact.get(&pattern) {
            Some(&index) => self.entries[index].1 = handler,
            None => {
                self.exact.insert(pattern.clone(), self.entries.len());
                self.entries.push((pattern, handler));
            }
        }
    }

    /// Find the handler for a concrete request path.
    pub fn resolve(&self, path: &str) -> Option<&HandlerFn> {
        if let Some(&index) = self.exact.get(path) {
            return Some(&self.entries[index].1);
        }

        self.entries
            .iter()
            .find(|(pattern, _)| {
                is_wildcard(pattern) && path.starts_with(wildcard_prefix(pattern))
            })
            .map(|(_, handler)| handler)
    }

    /// Registered patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(pattern, _)| pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains(':')
}

fn wildcard_prefix(pattern: &str) -> &str {
    pattern.split('*').next().unwrap_or(pattern)
}
