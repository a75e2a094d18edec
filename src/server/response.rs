//! HTTP response types and utilities.

use std::collections::BTreeMap;
use serde::Serialize;

use crate::server::error::Error;

/// HTTP status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    Accepted = 202,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    InternalServerError = 500,
    NotImplemented = 501,
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Get the numeric code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

/// Represents an HTTP response.
///
/// A fresh `200 OK` response with no headers and an empty body is handed to the
/// middleware chain and then to the route handler, which mutate it in place.
/// `Content-Type` and `Content-Length` are filled in by [`HttpResponse::to_bytes`]
/// only when the caller has not set them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The numeric status code
    pub status_code: u16,
    /// The reason phrase sent after the code
    pub status_text: String,
    /// The HTTP headers, serialized in name order
    pub headers: BTreeMap<String, String>,
    /// The response body
    pub body: Vec<u8>,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}

impl HttpResponse {
    /// Content type used when none was set.
    pub const DEFAULT_CONTENT_TYPE: &'static str = "text/html";

    /// Create a new HTTP response with the given status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status_code: status.as_u16(),
            status_text: status.reason_phrase().to_string(),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Set the status code and its standard reason phrase.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status_code = status.as_u16();
        self.status_text = status.reason_phrase().to_string();
    }

    /// Set an arbitrary status code and reason phrase.
    pub fn set_status_code(&mut self, code: u16, text: impl Into<String>) {
        self.status_code = code;
        self.status_text = text.into();
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Get a header that has been set explicitly.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Set the response body with a string.
    pub fn with_body_string(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Set the response body with bytes.
    pub fn with_body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Set the response body with a JSON value.
    ///
    /// This method serializes the provided value to JSON and sets it as the response body.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(value)?;
        Ok(self
            .with_content_type("application/json")
            .with_body_bytes(json))
    }

    /// Serialize the response for the wire.
    ///
    /// Adds `Content-Type: text/html` and a `Content-Length` matching the body
    /// unless those headers are already present; explicit values are never replaced.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut headers = self.headers.clone();
        headers
            .entry("Content-Type".to_string())
            .or_insert_with(|| Self::DEFAULT_CONTENT_TYPE.to_string());
        headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| self.body.len().to_string());

        let mut bytes = Vec::with_capacity(self.body.len() + 128);

        let status_line = format!("HTTP/1.1 {} {}\r\n", self.status_code, self.status_text);
        bytes.extend_from_slice(status_line.as_bytes());

        for (name, value) in &headers {
            let header_line = format!("{name}: {value}\r\n");
            bytes.extend_from_slice(header_line.as_bytes());
        }

        bytes.extend_from_slice(b"\r\n");
        bytes.extend_from_slice(&self.body);

        bytes
    }
}
