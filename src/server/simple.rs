//! Single-page blocking hosts.
//!
//! These serve one fixed HTML body to every connection on a plain accept loop,
//! without reading the request. They have no shutdown path and run until an
//! accept fails; use [`HttpServer`](crate::server::HttpServer) for anything else.

use std::fs;
use std::io::Write;
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};

use log::{error, info, warn};
use socket2::{Domain, Protocol, Socket, Type};

use crate::server::{Error, HttpResponse};

/// A bound socket that answers every connection with the same page.
pub struct SimpleHost {
    listener: TcpListener,
    response: Vec<u8>,
}

impl SimpleHost {
    /// Bind `addr` with a backlog of one and prepare the response for `html`.
    pub fn bind(addr: SocketAddr, html: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.bind(&addr.into())?;
        socket.listen(1)?;

        let response = HttpResponse::default()
            .with_content_type(HttpResponse::DEFAULT_CONTENT_TYPE)
            .with_body_bytes(html)
            .to_bytes();

        Ok(Self {
            listener: socket.into(),
            response,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and answer connections forever.
    ///
    /// Returns only when `accept` fails. A failed write drops that one client.
    pub fn serve(&self) -> Result<(), Error> {
        loop {
            let (mut stream, peer) = self.listener.accept().map_err(|e| {
                error!("accept: {e}");
                e
            })?;

            if let Err(e) = stream.write_all(&self.response) {
                warn!("Failed to send page to {peer}: {e}");
            }
        }
    }
}

fn any_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Serve `html` on every interface at `port` until an accept fails.
pub fn host(html: &str, port: u16) -> Result<(), Error> {
    let server = SimpleHost::bind(any_addr(port), html)?;
    info!("Hosting at http://localhost:{port}");
    server.serve()
}

/// Serve the contents of `filename` on every interface at `port`.
///
/// The file is read once, up front.
pub fn host_file(filename: &str, port: u16) -> Result<(), Error> {
    let html = fs::read(filename).map_err(|e| {
        error!("Failed to open file: {filename}");
        e
    })?;

    let server = SimpleHost::bind(any_addr(port), html)?;
    info!("Hosting file '{filename}' at http://localhost:{port}");
    server.serve()
}

/// Host two files on two ports at once, each on its own thread.
///
/// Blocks until both hosts return. The first error is reported.
pub fn multihosts(port1: u16, file1: &str, port2: u16, file2: &str) -> Result<(), Error> {
    let first = file1.to_string();
    let second = file2.to_string();

    let t1 = thread::spawn(move || host_file(&first, port1));
    let t2 = thread::spawn(move || host_file(&second, port2));
    join_hosts((port1, t1), (port2, t2))
}

type HostThread = (u16, JoinHandle<Result<(), Error>>);

/// Join both host threads before looking at either result, so a panic in one
/// never leaves the other detached.
fn join_hosts((port1, t1): HostThread, (port2, t2): HostThread) -> Result<(), Error> {
    let joined1 = t1.join();
    let joined2 = t2.join();

    let r1 = joined1.map_err(|_| Error::InternalError(format!("host on port {port1} panicked")))?;
    let r2 = joined2.map_err(|_| Error::InternalError(format!("host on port {port2} panicked")))?;
    r1.and(r2)
}
