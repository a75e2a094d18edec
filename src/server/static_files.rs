//! Static file serving under a route prefix.
//!
//! The request path minus the route prefix is appended to the directory as-is.
//! There is no path-traversal check: a request such as `/static/../secret` reads
//! outside the directory. Only serve trusted trees until this is addressed.

use std::fs;
use std::path::Path;

use log::debug;

use crate::parser::HttpRequest;
use crate::server::{Error, HttpResponse, StatusCode};

/// Body sent when the requested file cannot be read.
pub const FILE_NOT_FOUND_BODY: &str = "File not found";

/// Content type for a file extension, from a fixed table.
///
/// Unknown extensions return `None`; serialization then falls back to `text/html`.
pub fn mime_type(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "html" => Some("text/html"),
        "css" => Some("text/css"),
        "js" => Some("application/javascript"),
        "json" => Some("application/json"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// Build the handler registered by [`HttpServer::static_files`](crate::server::HttpServer::static_files).
pub fn handler(
    route_prefix: &str,
    directory: &str,
) -> impl Fn(&HttpRequest, &mut HttpResponse) -> Result<(), Error> + Send + Sync + 'static {
    let prefix_len = route_prefix.len();
    let directory = directory.to_string();

    move |request, response| {
        let relative = request.path.get(prefix_len..).unwrap_or_default();
        let file_path = format!("{directory}{relative}");

        match fs::read(&file_path) {
            Ok(content) => {
                if let Some(content_type) = mime_type(Path::new(&file_path)) {
                    response.set_header("Content-Type", content_type);
                }
                response.set_body(content);
            }
            Err(e) => {
                debug!("Static file {file_path} unavailable: {e}");
                response.set_status(StatusCode::NotFound);
                response.set_body(FILE_NOT_FOUND_BODY);
            }
        }
        Ok(())
    }
}
