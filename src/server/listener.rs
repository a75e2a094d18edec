//! Listening socket setup and readiness polling.

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::os::fd::AsRawFd;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};

/// Create a non-blocking listener with `SO_REUSEADDR` and the given backlog.
///
/// Non-blocking matters because every worker polls the same socket: a worker
/// that wakes up but loses the accept race must get `WouldBlock` back instead of
/// parking inside `accept`.
pub fn bind_listener(addr: SocketAddr, backlog: usize) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(i32::try_from(backlog).unwrap_or(i32::MAX))?;

    let listener: TcpListener = socket.into();
    listener.set_nonblocking(true)?;
    Ok(listener)
}

/// Wait up to `timeout` for `listener` to have a connection ready to accept.
///
/// An interrupted wait reports "not ready". Error or hang-up events without a
/// pending connection are returned as an error.
pub fn wait_readable(listener: &TcpListener, timeout: Duration) -> io::Result<bool> {
    let mut fds = libc::pollfd {
        fd: listener.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

    // SAFETY: `fds` is a single valid pollfd that outlives the call.
    let ready = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    if ready < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }

    if ready == 0 {
        return Ok(false);
    }
    readiness(fds.revents)
}

/// Classify the `revents` of a completed poll.
///
/// A pending connection wins over error bits so it is still accepted. Error bits
/// alone are an error, so the caller backs off instead of polling again at once.
fn readiness(revents: libc::c_short) -> io::Result<bool> {
    if revents & libc::POLLIN != 0 {
        return Ok(true);
    }
    if revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("listening socket reported poll events {revents:#x}"),
        ));
    }
    Ok(false)
}
