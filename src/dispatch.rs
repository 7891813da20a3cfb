use std::io;
use std::net::SocketAddr;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;

use crate::client::{Client, CLOSING, LISTENING, TLS, TLS_HANDSHAKING, UDP};
use crate::poll::{Poll, Tag, TimerDef};
use crate::sys::epoll::Events;
use crate::tls::HandshakeStatus;
use crate::wqueue::{TickId, Wqueue};
use crate::{Result, CLOCK_REFRESH_LOOPS, MAX_EVENTS};

/// Proof that the caller is inside the dispatcher's read path. Only the
/// dispatcher can construct one, which keeps the read hook uninvokable
/// from anywhere else.
pub struct ReadToken {
    _priv: (),
}

/// The callback surface the application hands to [`Dispatcher::new`].
///
/// `Data` is embedded in every [`Client`] record and dropped when the
/// record is released.
pub trait Handler: Send + Sync + Sized + 'static {
    type Data: Default + Send + Sync + 'static;

    /// A connection has been accepted and, for TLS listeners, finished its
    /// handshake.
    fn on_new(&self, core: &Dispatcher<Self>, client: &Client<Self::Data>);

    /// The client has data waiting. Return `false` to close it.
    ///
    /// For any one client this is never entered by two threads at once,
    /// and never entered again once [`Dispatcher::close`] has returned.
    fn on_read(
        &self,
        core: &Dispatcher<Self>,
        client: &Client<Self::Data>,
        token: &ReadToken,
    ) -> bool;

    /// The record is about to be released; fires exactly once per
    /// successful `on_new`.
    fn on_close(&self, client: &Client<Self::Data>);

    /// Runs synchronously inside [`Dispatcher::close`], before the socket
    /// is torn down.
    fn on_killed(&self, _core: &Dispatcher<Self>, _client: &Client<Self::Data>) {}

    /// Runs once per dispatch loop, after the quiescence tick.
    fn on_tick(&self, _core: &Dispatcher<Self>) {}

    /// A datagram arrived on a socket created with
    /// [`Dispatcher::listen_udp`].
    fn on_datagram(&self, _core: &Dispatcher<Self>, _datagram: &[u8], _from: SocketAddr) {}
}

/// A closed record travelling through the quiescence queue.
pub(crate) struct ClosedClient<T>(NonNull<Client<T>>);

// The pointee is only touched by the free callback, after quiescence has
// retired every other reference.
unsafe impl<T: Send> Send for ClosedClient<T> {}
unsafe impl<T: Sync> Sync for ClosedClient<T> {}

fn free_client<H: Handler>(handler: &H, closed: ClosedClient<H::Data>) {
    // Quiescence contract: every registered worker has ticked since the
    // rotation that isolated this bucket, so this is the last reference.
    let mut client = unsafe { Box::from_raw(closed.0.as_ptr()) };

    if let Some(mut session) = client.tls.get_mut().take() {
        session.quiet_shutdown();
    }

    // TLS_HANDSHAKING still set means negotiation never completed, so
    // on_new never fired and no close hook is owed.
    if client.flags() & TLS_HANDSHAKING == 0 {
        handler.on_close(&client);
    }
}

fn unix_time() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// The connection dispatcher: one per process, shared by every worker
/// thread.
///
/// Owns the poll backend, the built-in timers, the quiescence queue for
/// closed records and the approximate clock. Workers call [`run`] (or
/// [`register_thread`] + [`dispatch_one`] when they own their loop); the
/// kernel distributes readiness events among them.
///
/// [`run`]: Dispatcher::run
/// [`register_thread`]: Dispatcher::register_thread
/// [`dispatch_one`]: Dispatcher::dispatch_one
pub struct Dispatcher<H: Handler> {
    pub(crate) poll: Poll,
    pub(crate) closed: Wqueue<ClosedClient<H::Data>>,
    pub(crate) handler: Arc<H>,
    time: AtomicI64,
    loops: AtomicU32,
}

impl<H: Handler> Dispatcher<H> {
    pub fn new(handler: H, timers: Vec<TimerDef>) -> Result<Dispatcher<H>> {
        let handler = Arc::new(handler);

        let free_handler = handler.clone();
        let closed = Wqueue::new(move |c| free_client(&*free_handler, c));

        Ok(Dispatcher {
            poll: Poll::new(timers)?,
            closed,
            handler,
            time: AtomicI64::new(unix_time()),
            loops: AtomicU32::new(0),
        })
    }

    /// Registers the calling thread with the quiescence queue. Every
    /// registered thread must keep dispatching for closed records to be
    /// released.
    pub fn register_thread(&self) -> TickId {
        self.closed.register()
    }

    /// Runs the event loop for the rest of the process lifetime.
    pub fn run(&self) -> ! {
        let id = self.register_thread();
        let mut events = Events::with_capacity(MAX_EVENTS);

        loop {
            self.dispatch(id, &mut events);
        }
    }

    /// A single poll/classify/tick pass, for callers that own their loop.
    pub fn dispatch_one(&self, id: TickId) {
        let mut events = Events::with_capacity(MAX_EVENTS);
        self.dispatch(id, &mut events);
    }

    fn dispatch(&self, id: TickId, events: &mut Events) {
        let n = self.poll.wait(events);
        let mut delayed: Vec<usize> = Vec::new();

        for i in 0..n {
            let ev = match events.get(i) {
                Some(ev) => ev,
                None => break,
            };

            match Tag::decode(ev.tag()) {
                Tag::Timer(idx) => {
                    if let Some(timer) = self.poll.timers().get(idx) {
                        timer.drain();

                        if timer.is_delayed() {
                            delayed.push(idx);
                        } else {
                            timer.fire();
                        }
                    }
                }
                Tag::Client(ptr) => {
                    // The tag is a pointer this dispatcher registered, and
                    // the record outlives the batch: it is freed at the
                    // earliest two tick rotations after its close, and this
                    // thread has not ticked yet.
                    let client = unsafe { &*(ptr as *const Client<H::Data>) };
                    let flags = client.flags();

                    if flags & LISTENING != 0 {
                        self.accept_burst(client);
                    } else if flags & UDP != 0 {
                        self.read_datagrams(client);
                    } else if ev.is_hup() || ev.is_error() {
                        self.close(client);
                    } else if ev.is_readable() {
                        self.client_read(client);
                    }
                }
            }
        }

        for idx in delayed {
            self.poll.timers()[idx].fire();
        }

        self.closed.tick(id);

        if self.loops.fetch_add(1, Ordering::Relaxed) % CLOCK_REFRESH_LOOPS
            == CLOCK_REFRESH_LOOPS - 1
        {
            self.time.store(unix_time(), Ordering::Relaxed);
        }

        self.handler.on_tick(self);
    }

    /// Routes one readiness event into the read path, keeping the
    /// at-most-one-thread-per-client discipline.
    ///
    /// The read-operation counter is the whole protocol: the thread that
    /// takes it from 0 owns the client; later arrivals bump the counter
    /// and bounce, and the owner keeps absorbing those turns so no edge
    /// is ever dropped. The close paths deliberately leave the counter
    /// elevated, which locks every future arrival out for good.
    pub(crate) fn client_read(&self, client: &Client<H::Data>) {
        if client.read_operations.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        loop {
            if client.is_closing() {
                // Acquire pairs with the closing thread's fetch_or: its
                // teardown is visible, and the counter stays elevated.
                break;
            }

            if client.flags() & TLS_HANDSHAKING != 0 {
                // The read token serializes access to the session.
                let step = match unsafe { client.tls.get() }.as_mut() {
                    Some(session) => session.handshake_step(),
                    None => HandshakeStatus::Failed,
                };

                match step {
                    HandshakeStatus::Done => {
                        client.clear_flags(TLS_HANDSHAKING);
                        self.handler.on_new(self, client);
                    }
                    HandshakeStatus::Again => {}
                    HandshakeStatus::Failed => {
                        self.close(client);
                        break;
                    }
                }
            } else if !self
                .handler
                .on_read(self, client, &ReadToken { _priv: () })
            {
                self.close(client);
                break;
            }

            if client.read_operations.fetch_sub(1, Ordering::AcqRel) == 1 || client.is_closing() {
                break;
            }
        }
    }

    /// Begins tearing the client down. Idempotent, non-blocking, callable
    /// from any thread including the hooks.
    ///
    /// On the first call the optional killed hook runs, the socket is
    /// closed (which also removes it from the poll set) and the record
    /// moves to the quiescence queue; the close hook fires when the record
    /// is finally released.
    pub fn close(&self, client: &Client<H::Data>) {
        if client.or_flags(CLOSING) & CLOSING != 0 {
            return;
        }

        self.handler.on_killed(self, client);

        let fd = client.sock.swap(-1, Ordering::AcqRel);
        if fd != -1 {
            crate::sys::socket::close(fd);
        }

        self.closed.add(ClosedClient(NonNull::from(client)));
    }

    /// Reads from the client, through the TLS record layer when one is
    /// attached. Returns `Ok(0)` once the client has been closed.
    ///
    /// Does no locking: read events for one client are serialized by the
    /// dispatcher already.
    pub fn read(&self, client: &Client<H::Data>, buf: &mut [u8]) -> io::Result<usize> {
        let fd = client.fd();
        if fd == -1 {
            return Ok(0);
        }

        if client.flags() & TLS != 0 {
            // Serialized with the handshake path by the read token.
            match unsafe { client.tls.get() }.as_mut() {
                Some(session) => session.read(buf),
                None => Ok(0),
            }
        } else {
            crate::sys::socket::recv(fd, buf)
        }
    }

    /// Writes to the client under its spinlock, so concurrent writers from
    /// any number of threads never interleave within a record.
    ///
    /// The lock is not reentrant: callers must not already hold it.
    pub fn write(&self, client: &Client<H::Data>, buf: &[u8]) -> io::Result<usize> {
        if client.fd() == -1 {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "client has been closed",
            ));
        }

        client.lock();

        let ret = if client.flags() & TLS != 0 {
            // The spinlock serializes writers against each other; the
            // record layer is never entered concurrently for writes.
            match unsafe { client.tls.get() }.as_mut() {
                Some(session) => session.write(buf),
                None => Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "client has been closed",
                )),
            }
        } else {
            crate::sys::socket::send(client.fd(), buf)
        };

        client.unlock();

        if let Err(e) = &ret {
            info!("client write error (fd {}): {}", client.fd(), e);
        }

        ret
    }

    /// The approximate current time in unix seconds, refreshed every few
    /// dispatch loops. Readers accept staleness up to the refresh
    /// interval.
    pub fn now(&self) -> i64 {
        self.time.load(Ordering::Relaxed)
    }

    /// A debugging hook: releases every closed record immediately,
    /// regardless of the consequences. Test cases only.
    pub fn flush_closed(&self) {
        self.closed.flush();
    }
}
