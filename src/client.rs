use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicI32, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::thread;

use openssl::ssl::SslContext;

use crate::tls::{TlsSession, TlsSlot};

/// This client accepts connections on its socket.
pub(crate) const LISTENING: u8 = 0b0000_0001;

/// This client's socket is datagram-bound.
pub(crate) const UDP: u8 = 0b0000_0010;

/// The connection runs TLS.
pub(crate) const TLS: u8 = 0b0000_0100;

/// The TLS handshake has not completed yet; readiness events feed the
/// handshake instead of the read hook, and `on_new` has not fired.
pub(crate) const TLS_HANDSHAKING: u8 = 0b0000_1000;

/// The client is being torn down; no hook may be entered anymore.
pub(crate) const CLOSING: u8 = 0b1000_0000;

static NEXT_IDENT: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static IDENT: u64 = NEXT_IDENT.fetch_add(1, Ordering::Relaxed) + 1;
}

fn thread_ident() -> u64 {
    IDENT.with(|i| *i)
}

/// A connection record, embedding the application's per-client state `T`.
///
/// Records are created by the accept path and destroyed through the
/// quiescence queue; application code only ever sees them by reference.
pub struct Client<T> {
    /// The underlying socket. `-1` once the close protocol has run.
    pub(crate) sock: AtomicI32,

    /// The server context, for listening sockets with TLS enabled.
    pub(crate) tls_ctx: Option<SslContext>,

    /// The per-connection TLS session, for accepted TLS clients.
    pub(crate) tls: TlsSlot,

    pub(crate) lock: AtomicU32,
    pub(crate) lock_owner: AtomicU64,

    /// The one-token entry gate for read events.
    pub(crate) read_operations: AtomicU32,

    pub(crate) flags: AtomicU8,

    data: T,
}

impl<T> Client<T> {
    pub(crate) fn stream(sock: RawFd, flags: u8, tls: Option<TlsSession>, data: T) -> Client<T> {
        Client {
            sock: AtomicI32::new(sock),
            tls_ctx: None,
            tls: TlsSlot::new(tls),
            lock: AtomicU32::new(0),
            lock_owner: AtomicU64::new(0),
            read_operations: AtomicU32::new(0),
            flags: AtomicU8::new(flags),
            data,
        }
    }

    pub(crate) fn pseudo(sock: RawFd, flags: u8, tls_ctx: Option<SslContext>, data: T) -> Client<T> {
        Client {
            tls_ctx,
            ..Client::stream(sock, flags, None, data)
        }
    }

    /// The application state embedded in this record.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The socket handle, `-1` once the client has been closed.
    pub fn fd(&self) -> RawFd {
        self.sock.load(Ordering::Acquire)
    }

    pub fn is_closing(&self) -> bool {
        self.flags() & CLOSING != 0
    }

    #[inline]
    pub(crate) fn flags(&self) -> u8 {
        self.flags.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn or_flags(&self, bits: u8) -> u8 {
        self.flags.fetch_or(bits, Ordering::AcqRel)
    }

    #[inline]
    pub(crate) fn clear_flags(&self, bits: u8) -> u8 {
        self.flags.fetch_and(!bits, Ordering::AcqRel)
    }

    /// Acquires this client's spinlock, serializing writers from arbitrary
    /// threads.
    ///
    /// Busy-waits with a scheduler yield between attempts: holders may
    /// legitimately sit in a syscall, so hot spinning would only burn the
    /// quantum they need to finish. The lock is not reentrant; the read
    /// hook must not take it for the client it is being invoked on.
    pub fn lock(&self) {
        debug_assert_ne!(
            self.lock_owner.load(Ordering::Relaxed),
            thread_ident(),
            "client lock is not reentrant"
        );

        while self
            .lock
            .compare_exchange(0, 1, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            thread::yield_now();
        }

        self.lock_owner.store(thread_ident(), Ordering::Relaxed);
    }

    /// Releases the spinlock. May be issued by a thread other than the
    /// acquirer, but only once the acquirer has finished its critical
    /// section.
    pub fn unlock(&self) {
        self.lock_owner.store(0, Ordering::Relaxed);
        let _ = self
            .lock
            .compare_exchange(1, 0, Ordering::Release, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn bare_client() -> Client<()> {
        Client::stream(-1, 0, None, ())
    }

    #[test]
    fn flag_layout_is_stable() {
        assert_eq!(LISTENING, 0x01);
        assert_eq!(UDP, 0x02);
        assert_eq!(TLS, 0x04);
        assert_eq!(TLS_HANDSHAKING, 0x08);
        assert_eq!(CLOSING, 0x80);
    }

    #[test]
    fn closing_is_sticky_and_idempotent() {
        let client = bare_client();

        assert_eq!(client.or_flags(CLOSING) & CLOSING, 0);
        assert_ne!(client.or_flags(CLOSING) & CLOSING, 0);
        assert!(client.is_closing());
    }

    #[test]
    fn lock_excludes_other_threads() {
        const THREADS: usize = 4;
        const ITERS: usize = 2000;

        let client = Arc::new(bare_client());
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let client = client.clone();
                let inside = inside.clone();
                thread::spawn(move || {
                    for _ in 0..ITERS {
                        client.lock();
                        assert_eq!(inside.fetch_add(1, Ordering::AcqRel), 0);
                        inside.fetch_sub(1, Ordering::AcqRel);
                        client.unlock();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn unlock_from_another_thread() {
        let client = Arc::new(bare_client());
        let unlocked = Arc::new(AtomicBool::new(false));

        client.lock();

        let c = client.clone();
        let u = unlocked.clone();
        thread::spawn(move || {
            c.unlock();
            u.store(true, Ordering::Release);
        })
        .join()
        .unwrap();

        assert!(unlocked.load(Ordering::Acquire));

        // The word is free again.
        client.lock();
        client.unlock();
    }

    #[test]
    #[should_panic(expected = "not reentrant")]
    #[cfg(debug_assertions)]
    fn recursive_lock_asserts() {
        let client = bare_client();
        client.lock();
        client.lock();
    }
}
