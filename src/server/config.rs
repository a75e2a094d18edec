//! Server configuration.

use std::net::{SocketAddr, ToSocketAddrs};

use crate::server::error::Error;

/// HTTP server configuration.
///
/// Copied into the server at construction and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The host name or IP address to bind to.
    pub host: String,
    /// The port to bind to; 0 picks an ephemeral port.
    pub port: u16,
    /// The listen backlog.
    pub max_connections: usize,
    /// The per-connection read buffer size; at most `buffer_size - 1` bytes are read.
    pub buffer_size: usize,
    /// The number of worker threads sharing the listening socket.
    pub thread_pool_size: usize,
    /// Log per-request lines and lifecycle events at `info` instead of `debug`.
    pub verbose: bool,
}

impl ServerConfig {
    /// Resolve `host:port` to the first matching socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| Error::InvalidAddress(format!("{}:{} ({e})", self.host, self.port)))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }

    /// Check the settings the worker pool depends on.
    pub fn validate(&self) -> Result<(), Error> {
        if self.thread_pool_size == 0 {
            return Err(Error::InvalidConfig("thread_pool_size must be at least 1".to_string()));
        }
        if self.buffer_size < 2 {
            return Err(Error::InvalidConfig("buffer_size must be at least 2".to_string()));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_connections: 10,
            buffer_size: 4096,
            thread_pool_size: 4,
            verbose: false,
        }
    }
}
