//! An edge-triggered, multi-threaded TCP and TLS connection dispatcher.
//!
//! One process-wide [`Dispatcher`] owns an edge-triggered poll set shared
//! by any number of worker threads; the kernel distributes readiness
//! events among them. A lock-free counter protocol keeps at most one
//! thread inside the application's read hook per client, and closed
//! records are released through a tick-synchronized quiescence queue once
//! no worker can still be holding a reference.
//!
//! The dispatcher is protocol-agnostic: it never inspects the bytes it
//! moves. The application supplies its own buffering and framing through
//! the [`Handler`] callbacks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::thread;
//!
//! use quick_event::{Client, Dispatcher, Handler, ReadToken};
//!
//! struct Echo;
//!
//! impl Handler for Echo {
//!     type Data = ();
//!
//!     fn on_new(&self, _core: &Dispatcher<Self>, _client: &Client<()>) {}
//!
//!     fn on_read(
//!         &self,
//!         core: &Dispatcher<Self>,
//!         client: &Client<()>,
//!         _token: &ReadToken,
//!     ) -> bool {
//!         let mut buf = [0u8; 4096];
//!         match core.read(client, &mut buf) {
//!             Ok(0) => false,
//!             Ok(n) => core.write(client, &buf[..n]).is_ok(),
//!             Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => true,
//!             Err(_) => false,
//!         }
//!     }
//!
//!     fn on_close(&self, _client: &Client<()>) {}
//! }
//!
//! let core = Arc::new(Dispatcher::new(Echo, Vec::new()).unwrap());
//! core.listen("127.0.0.1", 5000).unwrap();
//!
//! for _ in 0..4 {
//!     let core = core.clone();
//!     thread::spawn(move || core.run());
//! }
//! # loop {}
//! ```

#[macro_use]
mod sys;

mod client;
mod dispatch;
mod error;
mod listener;
mod lock;
mod poll;
mod tls;
mod user;
mod wqueue;

pub use client::Client;
pub use dispatch::{Dispatcher, Handler, ReadToken};
pub use error::{Error, Result};
pub use lock::{RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use poll::{TimerDef, TimerOpt};
pub use tls::{DhSize, TlsOptions};
pub use user::drop_to_user;
pub use wqueue::TickId;

/// How many connections the kernel backlogs per listening socket.
pub const LISTEN_BACKLOG: i32 = 1000;

/// The maximum number of events asked for per poll wait.
pub const MAX_EVENTS: usize = 100;

/// How long a worker waits in the poll before giving up and ticking.
///
/// A bounded wait is required for correctness, not just liveness: with few
/// events one thread would soak up all of them while the others block
/// forever, and the quiescence queue would never rotate.
pub const POLL_TIMEOUT_MS: i32 = 100;

/// The largest accepted UDP datagram.
pub const MAX_UDP_DATAGRAM: usize = 8192;

/// How many connections one wake may accept before re-arming the listener,
/// so an accept flood cannot starve other descriptors.
pub(crate) const MAX_ACCEPTS_PER_WAKE: usize = 64;

/// Every how many dispatch loops the approximate clock is refreshed.
pub(crate) const CLOCK_REFRESH_LOOPS: u32 = 5;
