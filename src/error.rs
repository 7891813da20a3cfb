use std::io;

use thiserror::Error;

/// Failure kinds of the core.
///
/// Per-connection kinds (`Accept`, `TlsHandshake`, `TlsIo`, `Poll`) never
/// escape the dispatcher: they close the affected client (or are logged)
/// and the loop keeps running. `Init`, `Listen` and `Privilege` are
/// returned to the caller of the respective setup call.
#[derive(Debug, Error)]
pub enum Error {
    /// Poll backend or TLS library setup failed. Fatal at startup.
    #[error("backend initialization failed")]
    Init(#[source] io::Error),

    /// socket/bind/listen/setsockopt failed. Fatal for that listener only.
    #[error("listen failed")]
    Listen(#[source] io::Error),

    /// Accepting one connection failed; the listener continues.
    #[error("accept failed")]
    Accept(#[source] io::Error),

    /// A TLS handshake step failed; only that connection is closed.
    #[error("TLS handshake failed")]
    TlsHandshake(#[source] openssl::ssl::Error),

    /// A TLS record read/write failed; treated as an I/O failure on that
    /// client.
    #[error("TLS read/write failed")]
    TlsIo(#[source] openssl::ssl::Error),

    /// `epoll_wait` failed with something other than `EINTR`.
    #[error("poll wait failed")]
    Poll(#[source] io::Error),

    /// User lookup or uid/gid switch failed.
    #[error("privilege drop failed")]
    Privilege(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
