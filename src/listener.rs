use std::io;
use std::net::Ipv4Addr;
use std::os::unix::io::RawFd;

use log::{error, warn};
use openssl::ssl::SslContext;

use crate::client::{Client, LISTENING, TLS, TLS_HANDSHAKING, UDP};
use crate::dispatch::{Dispatcher, Handler};
use crate::error::Error;
use crate::poll::Tag;
use crate::sys::socket;
use crate::tls::{self, HandshakeStatus, TlsOptions, TlsSession};
use crate::{Result, LISTEN_BACKLOG, MAX_ACCEPTS_PER_WAKE, MAX_UDP_DATAGRAM};

fn parse_ip(ip: &str) -> Result<Ipv4Addr> {
    ip.parse().map_err(|_| {
        Error::Listen(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not an IPv4 address: {}", ip),
        ))
    })
}

fn stack_err(e: openssl::error::ErrorStack) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

impl<H: Handler> Dispatcher<H> {
    /// Listens for plain TCP connections on `ip:port` and routes them into
    /// the event loop.
    pub fn listen(&self, ip: &str, port: u16) -> Result<()> {
        let addr = parse_ip(ip)?;
        let fd = socket::tcp_listener(addr, port, LISTEN_BACKLOG).map_err(Error::Listen)?;

        self.install_pseudo(fd, LISTENING, None)
    }

    /// Listens for TLS connections with the shipped defaults (see
    /// [`TlsOptions`]).
    pub fn listen_tls(&self, ip: &str, port: u16, cert_path: &str, key_path: &str) -> Result<()> {
        self.listen_tls_opts(ip, port, cert_path, key_path, &TlsOptions::default())
    }

    pub fn listen_tls_opts(
        &self,
        ip: &str,
        port: u16,
        cert_path: &str,
        key_path: &str,
        opts: &TlsOptions,
    ) -> Result<()> {
        let ctx = tls::server_context(cert_path, key_path, opts)
            .map_err(|e| Error::Init(stack_err(e)))?;

        let addr = parse_ip(ip)?;
        let fd = socket::tcp_listener(addr, port, LISTEN_BACKLOG).map_err(Error::Listen)?;

        self.install_pseudo(fd, LISTENING | TLS, Some(ctx))
    }

    /// Binds a datagram socket; each datagram is handed to
    /// [`Handler::on_datagram`] as it arrives.
    pub fn listen_udp(&self, ip: &str, port: u16) -> Result<()> {
        let addr = parse_ip(ip)?;
        let fd = socket::udp_listener(addr, port).map_err(Error::Listen)?;

        self.install_pseudo(fd, UDP, None)
    }

    /// Wraps a bound socket in a pseudo-client and registers it, so the
    /// dispatcher's classifier routes its events like any other client's.
    fn install_pseudo(&self, fd: RawFd, flags: u8, tls_ctx: Option<SslContext>) -> Result<()> {
        let client = Box::new(Client::pseudo(fd, flags, tls_ctx, H::Data::default()));
        let ptr = Box::into_raw(client);

        if let Err(e) = self.poll.register(fd, Tag::Client(ptr as u64)) {
            // Not registered anywhere: this is still the only reference.
            unsafe { drop(Box::from_raw(ptr)) };
            socket::close(fd);
            return Err(Error::Listen(e));
        }

        Ok(())
    }

    /// Drains the accept backlog, up to the per-wake cap.
    pub(crate) fn accept_burst(&self, server: &Client<H::Data>) {
        let server_fd = server.fd();

        for _ in 0..MAX_ACCEPTS_PER_WAKE {
            let sock = match socket::accept(server_fd) {
                Ok(sock) => sock,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) => {
                    error!("could not accept client: {}", Error::Accept(e));

                    // Edge triggering: without a re-arm after an error the
                    // OS would never report this fd again.
                    self.rearm_listener(server);
                    return;
                }
            };

            let mut flags = 0u8;
            let mut session = None;

            if server.flags() & TLS != 0 {
                let ctx = match server.tls_ctx.as_ref() {
                    Some(ctx) => ctx,
                    None => {
                        socket::close(sock);
                        continue;
                    }
                };

                // Run the first handshake round here so dead-on-arrival
                // connections never reach the poll set.
                match TlsSession::accept(ctx, sock) {
                    Ok(mut s) => match s.handshake_step() {
                        HandshakeStatus::Done => {
                            session = Some(s);
                            flags |= TLS;
                        }
                        HandshakeStatus::Again => {
                            session = Some(s);
                            flags |= TLS | TLS_HANDSHAKING;
                        }
                        HandshakeStatus::Failed => {
                            socket::close(sock);
                            continue;
                        }
                    },
                    Err(e) => {
                        warn!("could not start TLS session (fd {}): {}", sock, e);
                        socket::close(sock);
                        continue;
                    }
                }
            }

            let handshaking = flags & TLS_HANDSHAKING != 0;
            let client = Box::new(Client::stream(sock, flags, session, H::Data::default()));
            let ptr = Box::into_raw(client);

            if let Err(e) = self.poll.register(sock, Tag::Client(ptr as u64)) {
                warn!("could not register client (fd {}): {}", sock, e);

                // Same as above: never registered, so still sole owner.
                unsafe { drop(Box::from_raw(ptr)) };
                socket::close(sock);
                continue;
            }

            if !handshaking {
                // The record now belongs to the poll set; the reference
                // stays valid through this batch.
                let client = unsafe { &*ptr };
                self.handler.on_new(self, client);
            }
        }

        // Cap reached with the backlog possibly non-empty: re-arm so the
        // edge fires again instead of starving other descriptors.
        self.rearm_listener(server);
    }

    fn rearm_listener(&self, server: &Client<H::Data>) {
        let fd = server.fd();

        if let Err(e) = self.poll.rearm(fd, Tag::Client(server as *const _ as u64)) {
            error!("could not re-arm listen fd {}: {}", fd, e);
        }
    }

    /// Drains waiting datagrams and hands each to the application.
    pub(crate) fn read_datagrams(&self, client: &Client<H::Data>) {
        let mut buf = [0u8; MAX_UDP_DATAGRAM];
        let fd = client.fd();

        loop {
            match socket::recv_from(fd, &mut buf) {
                Ok((n, from)) => self.handler.on_datagram(self, &buf[..n], from),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("udp read error (fd {}): {}", fd, e);
                    return;
                }
            }
        }
    }
}
