//! HTTP request parsing and representation.

use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;
use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// Represents an HTTP request.
///
/// Built once per connection by [`parse_request`] and read-only afterwards.
/// Tokens are kept exactly as they appeared on the wire; use [`HttpRequest::method`]
/// and [`HttpRequest::http_version`] for typed views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    /// The method token (GET, POST, ...), empty if the request line was malformed
    pub method: String,
    /// The request path with the query suffix removed (not percent-decoded)
    pub path: String,
    /// The protocol version token
    pub version: String,
    /// The HTTP headers; names are case-sensitive and the last duplicate wins
    pub headers: HashMap<String, String>,
    /// Query parameters parsed from the path
    pub query_params: HashMap<String, String>,
    /// The raw bytes following the blank line that ends the header block
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a new HTTP request with no headers, query parameters or body.
    ///
    /// # Arguments
    ///
    /// * `method` - The method token
    /// * `path` - The request path, without a query string
    /// * `version` - The version token
    pub fn new(method: impl Into<String>, path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Get a header value.
    ///
    /// Header names are matched exactly, so `host` does not find `Host`.
    ///
    /// # Arguments
    ///
    /// * `name` - The header name
    ///
    /// # Returns
    ///
    /// The header value, if it exists
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Get a header value, falling back to `default` when it is absent.
    pub fn header_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get_header(name).unwrap_or(default)
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Get a query parameter value.
    ///
    /// # Arguments
    ///
    /// * `name` - The query parameter name
    ///
    /// # Returns
    ///
    /// The query parameter value, if it exists
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Check if a query parameter exists.
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params.contains_key(name)
    }

    /// Interpret the method token as a known [`Method`].
    pub fn method(&self) -> Result<Method, Error> {
        Method::from_str(&self.method)
    }

    /// Interpret the version token as a known [`HttpVersion`].
    pub fn http_version(&self) -> Result<HttpVersion, Error> {
        HttpVersion::from_str(&self.version)
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Parse the request body as JSON.
    ///
    /// # Returns
    ///
    /// The parsed JSON value, or an error if the body is not declared or not valid JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        let json = serde_json::from_slice(&self.body)?;
        Ok(json)
    }

    /// Check if the request declares a JSON body.
    pub fn is_json(&self) -> bool {
        self.get_header("Content-Type")
            .is_some_and(|content_type| content_type.starts_with("application/json"))
    }
}

/// Parse an HTTP request from the bytes of a single read.
///
/// The input is split on `\n`. The first line is tokenised on whitespace into
/// method, path and version; a `?` in the path splits off the query string.
/// Following lines up to the first empty (or `\r`-only) line are headers, and
/// everything after that line is the body, verbatim.
///
/// Parsing never fails: missing pieces are left empty and header lines without
/// a colon are ignored. The whole request is assumed to have arrived in one read,
/// so a body longer than the read buffer is truncated.
///
/// # Arguments
///
/// * `input` - A byte slice containing the HTTP request to parse
pub fn parse_request(input: &[u8]) -> HttpRequest {
    let mut request = HttpRequest::default();
    let mut rest = input;

    let Some(request_line) = next_line(&mut rest) else {
        return request;
    };

    let request_line = String::from_utf8_lossy(request_line);
    let mut tokens = request_line.split_ascii_whitespace();
    request.method = tokens.next().unwrap_or_default().to_string();
    let raw_path = tokens.next().unwrap_or_default();
    request.version = tokens.next().unwrap_or_default().to_string();

    match raw_path.split_once('?') {
        Some((path, query)) => {
            request.path = path.to_string();
            request.query_params = parse_query(query);
        }
        None => request.path = raw_path.to_string(),
    }

    while let Some(line) = next_line(&mut rest) {
        if line.is_empty() || line == b"\r" {
            break;
        }

        let line = String::from_utf8_lossy(line);
        if let Some((name, value)) = line.split_once(':') {
            // The space after the colon is assumed, not checked.
            let mut value_chars = value.chars();
            value_chars.next();
            let value = value_chars.as_str();
            let value = value.strip_suffix('\r').unwrap_or(value);
            request.headers.insert(name.to_string(), value.to_string());
        }
    }

    request.body = rest.to_vec();
    request
}

/// Split a query string on `&`, then each pair on its first `=`.
///
/// Pairs without `=` are dropped; a repeated key keeps its last value.
fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Take the next `\n`-terminated line off the front of `rest`.
///
/// The final line may lack a terminator. Returns `None` once `rest` is empty.
fn next_line<'a>(rest: &mut &'a [u8]) -> Option<&'a [u8]> {
    if rest.is_empty() {
        return None;
    }

    match rest.iter().position(|&b| b == b'\n') {
        Some(end) => {
            let line = &rest[..end];
            *rest = &rest[end + 1..];
            Some(line)
        }
        None => {
            let line = *rest;
            *rest = &[];
            Some(line)
        }
    }
}
