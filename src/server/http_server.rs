//! HTTP server implementation.

use std::io::{self, BufRead};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::parser::HttpRequest;
use crate::server::config::ServerConfig;
use crate::server::connection::{Dispatcher, handle_connection};
use crate::server::error::Error;
use crate::server::listener::{bind_listener, wait_readable};
use crate::server::middleware::MiddlewareChain;
use crate::server::response::HttpResponse;
use crate::server::router::RouteTable;
use crate::server::static_files;

/// How long a worker waits on the listening socket before re-checking the running flag.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Lifecycle state of an [`HttpServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// An HTTP server backed by a fixed pool of worker threads.
///
/// Routes and middleware are registered while the server is stopped. `start`
/// freezes them into a shared snapshot and spawns `thread_pool_size` workers,
/// each polling the one listening socket and handling the connections it accepts.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    routes: RouteTable,
    middleware: MiddlewareChain,
    state: ServerState,
    running: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    listener: Option<Arc<TcpListener>>,
    local_addr: Option<SocketAddr>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            routes: RouteTable::new(),
            middleware: MiddlewareChain::new(),
            state: ServerState::Stopped,
            running: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
            listener: None,
            local_addr: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// The bound address while the server is running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Registered route patterns in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.routes.patterns()
    }

    /// Add a route to the server.
    ///
    /// A pattern containing `*` or `:` is matched by prefix when no exact route
    /// fits; see [`RouteTable`]. Ignored while the server is running.
    pub fn route<F>(&mut self, pattern: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&HttpRequest, &mut HttpResponse) -> Result<(), Error> + Send + Sync + 'static,
    {
        let pattern = pattern.into();
        if self.is_frozen() {
            warn!("Ignoring route {pattern} registered after start");
            return self;
        }
        self.routes.add_route(pattern, handler);
        self
    }

    /// Append a middleware step. Ignored while the server is running.
    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&HttpRequest, &mut HttpResponse) -> Result<bool, Error> + Send + Sync + 'static,
    {
        if self.is_frozen() {
            warn!("Ignoring middleware registered after start");
            return self;
        }
        self.middleware.push(middleware);
        self
    }

    /// Serve files from `directory` under `route_prefix`.
    ///
    /// Registers the wildcard route `{route_prefix}/*`. The remainder of the
    /// request path is appended to `directory` without sanitization.
    pub fn static_files(&mut self, route_prefix: &str, directory: &str) -> &mut Self {
        let handler = static_files::handler(route_prefix, directory);
        self.route(format!("{route_prefix}/*"), handler)
    }

    fn is_frozen(&self) -> bool {
        self.state != ServerState::Stopped
    }

    fn log_lifecycle(&self, message: &str) {
        if self.config.verbose {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    }

    /// Bind the listening socket and spawn the worker pool.
    ///
    /// On failure the server stays stopped and the error is returned.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.state != ServerState::Stopped {
            return Err(Error::AlreadyRunning);
        }
        self.state = ServerState::Starting;

        match self.spawn_workers() {
            Ok(addr) => {
                self.local_addr = Some(addr);
                self.state = ServerState::Running;
                self.log_lifecycle(&format!("Server started on http://{addr}"));
                Ok(())
            }
            Err(e) => {
                error!("Failed to start server: {e}");
                self.shutdown_workers();
                self.state = ServerState::Stopped;
                Err(e)
            }
        }
    }

    fn spawn_workers(&mut self) -> Result<SocketAddr, Error> {
        self.config.validate()?;
        let addr = self.config.socket_addr()?;
        let listener = Arc::new(bind_listener(addr, self.config.max_connections)?);
        let bound = listener.local_addr()?;

        let dispatcher = Arc::new(Dispatcher {
            routes: self.routes.clone(),
            middleware: self.middleware.clone(),
            verbose: self.config.verbose,
        });

        self.running.store(true, Ordering::SeqCst);
        self.listener = Some(Arc::clone(&listener));

        for id in 0..self.config.thread_pool_size {
            let worker = Worker {
                listener: Arc::clone(&listener),
                dispatcher: Arc::clone(&dispatcher),
                running: Arc::clone(&self.running),
                buffer_size: self.config.buffer_size,
            };
            let handle = thread::Builder::new()
                .name(format!("http-worker-{id}"))
                .spawn(move || worker.run())?;
            self.workers.push(handle);
        }

        Ok(bound)
    }

    fn shutdown_workers(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("Worker thread panicked");
            }
        }
        self.listener = None;
        self.local_addr = None;
    }

    /// Stop the workers and close the listening socket.
    ///
    /// Workers notice within one poll interval; a connection already being handled
    /// runs to completion first. Calling `stop` on a stopped server does nothing.
    pub fn stop(&mut self) {
        if self.state == ServerState::Stopped {
            return;
        }
        self.state = ServerState::Stopping;
        self.shutdown_workers();
        self.state = ServerState::Stopped;
        self.log_lifecycle("Server stopped");
    }

    /// Start, then block until a line is read from stdin, then stop.
    pub fn run(&mut self) -> Result<(), Error> {
        self.start()?;
        println!("Press Enter to stop the server...");
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line);
        self.stop();
        read?;
        Ok(())
    }
}

impl Drop for HttpServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One pool thread: poll, accept, handle, repeat until the running flag drops.
struct Worker {
    listener: Arc<TcpListener>,
    dispatcher: Arc<Dispatcher>,
    running: Arc<AtomicBool>,
    buffer_size: usize,
}

impl Worker {
    fn run(self) {
        while self.running.load(Ordering::SeqCst) {
            match wait_readable(&self.listener, POLL_TIMEOUT) {
                Ok(true) => self.accept_one(),
                Ok(false) => {}
                Err(e) => {
                    warn!("Poll on listening socket failed: {e}");
                    thread::sleep(POLL_TIMEOUT);
                }
            }
        }
    }

    fn accept_one(&self) {
        let (mut stream, peer) = match self.listener.accept() {
            Ok(accepted) => accepted,
            // Another worker took it.
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
            Err(e) => {
                warn!("Error accepting connection: {e}");
                return;
            }
        };

        if let Err(e) = stream.set_nonblocking(false) {
            warn!("Failed to configure connection from {peer}: {e}");
            return;
        }

        if let Err(e) = handle_connection(&mut stream, &self.dispatcher, self.buffer_size) {
            warn!("Error writing response to {peer}: {e}");
        }
    }
}
