use std::cell::UnsafeCell;
use std::io::{self, Read, Write};
use std::os::unix::io::RawFd;
use std::path::Path;
use std::sync::Once;

use log::warn;
use openssl::bn::BigNum;
use openssl::dh::Dh;
use openssl::ec::EcKey;
use openssl::error::ErrorStack;
use openssl::nid::Nid;
use openssl::pkey::Params;
use openssl::ssl::{
    ErrorCode, Ssl, SslContext, SslFiletype, SslMethod, SslMode, SslOptions, SslSessionCacheMode,
    SslStream,
};

use crate::error::Error;

mod dh_params;

use dh_params::{DH_GENERATOR, DH_P_1024, DH_P_2048, DH_P_4096};

/// The bundled ephemeral Diffie-Hellman parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhSize {
    Dh1024,
    Dh2048,
    Dh4096,
}

impl DhSize {
    fn prime(self) -> &'static [u8] {
        match self {
            DhSize::Dh1024 => DH_P_1024,
            DhSize::Dh2048 => DH_P_2048,
            DhSize::Dh4096 => DH_P_4096,
        }
    }
}

/// Listener-time TLS knobs. The defaults are the ones the server has
/// always shipped with.
pub struct TlsOptions {
    pub cipher_list: String,
    pub ecdh_curve: Nid,
    pub dh: DhSize,
}

impl Default for TlsOptions {
    fn default() -> TlsOptions {
        TlsOptions {
            cipher_list: "HIGH:!aNULL:!MD5".to_string(),
            ecdh_curve: Nid::X9_62_PRIME256V1,
            dh: DhSize::Dh2048,
        }
    }
}

static TLS_INIT: Once = Once::new();

fn dh(size: DhSize) -> Result<Dh<Params>, ErrorStack> {
    Dh::from_pqg(
        BigNum::from_slice(size.prime())?,
        None,
        BigNum::from_slice(DH_GENERATOR)?,
    )
}

fn dh_for_key_len(key_len: u32, default: DhSize) -> DhSize {
    match key_len {
        1024 => DhSize::Dh1024,
        2048 => DhSize::Dh2048,
        4096 => DhSize::Dh4096,
        _ => default,
    }
}

/// Builds the server-side context for one TLS listener.
///
/// The first call initializes the TLS library itself, which installs its
/// process-wide locking state for the lifetime of the process.
pub(crate) fn server_context<P: AsRef<Path>>(
    cert_path: P,
    key_path: P,
    opts: &TlsOptions,
) -> Result<SslContext, ErrorStack> {
    TLS_INIT.call_once(openssl::init);

    // The negotiating method gives the widest compatibility; the obsolete
    // protocol versions are refused below.
    let mut builder = SslContext::builder(SslMethod::tls())?;

    builder.set_options(
        SslOptions::NO_SSLV2
            | SslOptions::NO_SSLV3
            | SslOptions::NO_COMPRESSION
            | SslOptions::SINGLE_DH_USE
            | SslOptions::SINGLE_ECDH_USE,
    );

    builder.set_certificate_chain_file(cert_path)?;
    builder.set_private_key_file(key_path, SslFiletype::PEM)?;
    builder.check_private_key()?;

    builder.set_cipher_list(&opts.cipher_list)?;

    let default_dh = opts.dh;
    builder.set_tmp_dh_callback(move |_, _, key_len| dh(dh_for_key_len(key_len, default_dh)));

    let ecdh = EcKey::from_curve_name(opts.ecdh_curve)?;
    builder.set_tmp_ecdh(&ecdh)?;

    builder.set_session_cache_mode(SslSessionCacheMode::OFF);
    builder.set_mode(SslMode::RELEASE_BUFFERS);

    Ok(builder.build())
}

/// A non-owning mirror of a client's socket for the TLS record layer to
/// push bytes through. The client record owns the fd; once the close
/// protocol has run (or the mirror is disarmed) this only ever reports
/// `EBADF` instead of touching a possibly-reused descriptor.
struct RawSock {
    fd: RawFd,
}

impl RawSock {
    fn disarm(&mut self) {
        self.fd = -1;
    }
}

impl Read for RawSock {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fd < 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }

        crate::sys::socket::recv(self.fd, buf)
    }
}

impl Write for RawSock {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fd < 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }

        crate::sys::socket::send(self.fd, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) enum HandshakeStatus {
    /// Negotiation finished; the connection carries application records now.
    Done,
    /// The step needs more read/write progress; retry on the next
    /// readiness event.
    Again,
    /// Negotiation failed; the connection must be closed.
    Failed,
}

/// The per-connection TLS state, bound to the client's socket.
pub(crate) struct TlsSession {
    stream: SslStream<RawSock>,
}

impl TlsSession {
    pub(crate) fn accept(ctx: &SslContext, fd: RawFd) -> Result<TlsSession, ErrorStack> {
        let ssl = Ssl::new(ctx)?;
        let stream = SslStream::new(ssl, RawSock { fd })?;

        Ok(TlsSession { stream })
    }

    /// Attempts a single server-side handshake step.
    pub(crate) fn handshake_step(&mut self) -> HandshakeStatus {
        match self.stream.accept() {
            Ok(()) => HandshakeStatus::Done,
            Err(e) if matches!(e.code(), ErrorCode::WANT_READ | ErrorCode::WANT_WRITE) => {
                HandshakeStatus::Again
            }
            Err(e) => {
                warn!("{}", Error::TlsHandshake(e));
                HandshakeStatus::Failed
            }
        }
    }

    pub(crate) fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.ssl_read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.code() == ErrorCode::ZERO_RETURN => Ok(0),
            Err(e) if e.code() == ErrorCode::WANT_READ => {
                Err(io::Error::new(io::ErrorKind::WouldBlock, Error::TlsIo(e)))
            }
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, Error::TlsIo(e))),
        }
    }

    pub(crate) fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stream.ssl_write(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.code() == ErrorCode::WANT_WRITE => {
                Err(io::Error::new(io::ErrorKind::WouldBlock, Error::TlsIo(e)))
            }
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, Error::TlsIo(e))),
        }
    }

    /// Marks the session shut down in both directions without any I/O.
    ///
    /// By free time the socket has long been closed and its number may
    /// already belong to another connection, so the close-notify must never
    /// hit the wire: the mirror is disarmed first and the shutdown result
    /// ignored.
    pub(crate) fn quiet_shutdown(&mut self) {
        self.stream.get_mut().disarm();
        let _ = self.stream.shutdown();
    }
}

/// Holds a client's optional TLS session.
///
/// Interior mutability without a lock: handshake steps and record reads
/// are serialized by the read token, record writes by the client spinlock,
/// and the final teardown by quiescence, so no two threads ever touch the
/// session concurrently.
pub(crate) struct TlsSlot(UnsafeCell<Option<TlsSession>>);

unsafe impl Send for TlsSlot {}
unsafe impl Sync for TlsSlot {}

impl TlsSlot {
    pub(crate) fn new(session: Option<TlsSession>) -> TlsSlot {
        TlsSlot(UnsafeCell::new(session))
    }

    /// The caller must hold the serialization right described on the type.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn get(&self) -> &mut Option<TlsSession> {
        &mut *self.0.get()
    }

    pub(crate) fn get_mut(&mut self) -> &mut Option<TlsSession> {
        self.0.get_mut()
    }
}
