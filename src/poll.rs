use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use std::{fmt, ops};

use log::warn;

use crate::error::Error;
use crate::sys::epoll::{Epoll, Events};
use crate::sys::timerfd::TimerFd;
use crate::POLL_TIMEOUT_MS;

const EXCLUSIVE: u8 = 0b0001;
const DELAYED: u8 = 0b0010;

/// Options for a built-in periodic timer.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct TimerOpt(u8);

impl TimerOpt {
    #[inline]
    pub fn empty() -> TimerOpt {
        TimerOpt(0)
    }

    /// The callback is serialized: it never runs concurrently with itself,
    /// however many workers see the timer fire.
    #[inline]
    pub fn exclusive() -> TimerOpt {
        TimerOpt(EXCLUSIVE)
    }

    /// The callback runs after the event batch that saw the expiry, not in
    /// batch order.
    #[inline]
    pub fn delayed() -> TimerOpt {
        TimerOpt(DELAYED)
    }

    #[inline]
    pub fn is_exclusive(self) -> bool {
        self.contains(TimerOpt::exclusive())
    }

    #[inline]
    pub fn is_delayed(self) -> bool {
        self.contains(TimerOpt::delayed())
    }

    #[inline]
    pub fn contains(self, other: TimerOpt) -> bool {
        (self & other) == other
    }
}

impl ops::BitOr for TimerOpt {
    type Output = TimerOpt;

    #[inline]
    fn bitor(self, other: TimerOpt) -> TimerOpt {
        TimerOpt(self.0 | other.0)
    }
}

impl ops::BitAnd for TimerOpt {
    type Output = TimerOpt;

    #[inline]
    fn bitand(self, other: TimerOpt) -> TimerOpt {
        TimerOpt(self.0 & other.0)
    }
}

impl fmt::Debug for TimerOpt {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let mut one = false;
        let flags = [
            (TimerOpt::exclusive(), "Exclusive"),
            (TimerOpt::delayed(), "Delayed"),
        ];

        for (flag, msg) in flags {
            if self.contains(flag) {
                if one {
                    write!(fmt, " | ")?
                }
                write!(fmt, "{}", msg)?;

                one = true
            }
        }

        Ok(())
    }
}

/// A periodic timer declared at dispatcher construction. Callbacks take no
/// arguments and must not block.
pub struct TimerDef {
    pub interval: Duration,
    pub opts: TimerOpt,
    pub cb: Box<dyn Fn() + Send + Sync>,
}

impl TimerDef {
    pub fn new<F>(interval: Duration, opts: TimerOpt, cb: F) -> TimerDef
    where
        F: Fn() + Send + Sync + 'static,
    {
        TimerDef {
            interval,
            opts,
            cb: Box::new(cb),
        }
    }
}

pub(crate) struct Timer {
    fd: TimerFd,
    cb: Box<dyn Fn() + Send + Sync>,
    operations: AtomicU32,
    opts: TimerOpt,
}

impl Timer {
    /// Reads off the expiration count; without this the interval stops
    /// firing.
    pub(crate) fn drain(&self) {
        let _ = self.fd.read();
    }

    pub(crate) fn is_delayed(&self) -> bool {
        self.opts.is_delayed()
    }

    /// Runs the callback, honoring exclusivity with the same one-token
    /// counter protocol that serializes client reads.
    pub(crate) fn fire(&self) {
        if self.opts.is_exclusive() {
            if self.operations.fetch_add(1, Ordering::AcqRel) == 0 {
                loop {
                    (self.cb)();

                    if self.operations.fetch_sub(1, Ordering::AcqRel) - 1 == 0 {
                        break;
                    }
                }
            }
        } else {
            (self.cb)();
        }
    }
}

/// What the poll backend hands back with each event: either one of the
/// built-in timers or a client record. The low bit of the carried word is
/// the discriminator; client words are `Box` addresses and therefore even.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    Timer(usize),
    Client(u64),
}

impl Tag {
    pub(crate) fn encode(self) -> u64 {
        match self {
            Tag::Timer(idx) => ((idx as u64) << 1) | 1,
            Tag::Client(ptr) => {
                debug_assert_eq!(ptr & 1, 0);
                ptr
            }
        }
    }

    pub(crate) fn decode(raw: u64) -> Tag {
        if raw & 1 == 1 {
            Tag::Timer((raw >> 1) as usize)
        } else {
            Tag::Client(raw)
        }
    }
}

/// The process-wide readiness multiplexer: one edge-triggered epoll
/// instance shared by every worker thread, owning the timer descriptors
/// declared at construction.
pub(crate) struct Poll {
    epoll: Epoll,
    timers: Box<[Timer]>,
}

impl Poll {
    pub(crate) fn new(defs: Vec<TimerDef>) -> crate::Result<Poll> {
        let epoll = Epoll::new().map_err(Error::Init)?;

        let mut timers = Vec::with_capacity(defs.len());
        for (i, def) in defs.into_iter().enumerate() {
            let fd = TimerFd::new().map_err(Error::Init)?;
            fd.set_interval(def.interval).map_err(Error::Init)?;
            epoll
                .add(fd.as_raw_fd(), Tag::Timer(i).encode())
                .map_err(Error::Init)?;

            timers.push(Timer {
                fd,
                cb: def.cb,
                operations: AtomicU32::new(0),
                opts: def.opts,
            });
        }

        Ok(Poll {
            epoll,
            timers: timers.into_boxed_slice(),
        })
    }

    pub(crate) fn register(&self, fd: RawFd, tag: Tag) -> io::Result<()> {
        self.epoll.add(fd, tag.encode())
    }

    /// Re-arms an existing registration; required after an accept loop
    /// bails out on an error, since in edge mode the listening fd would
    /// otherwise never be reported again.
    pub(crate) fn rearm(&self, fd: RawFd, tag: Tag) -> io::Result<()> {
        self.epoll.modify(fd, tag.encode())
    }

    /// Fills `events` with up to its capacity of readiness events.
    /// Timeouts, signals and spurious wakeups all report `0`.
    pub(crate) fn wait(&self, events: &mut Events) -> usize {
        match self.epoll.wait(events, POLL_TIMEOUT_MS) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => 0,
            Err(e) => {
                warn!("{}", Error::Poll(e));
                0
            }
        }
    }

    pub(crate) fn timers(&self) -> &[Timer] {
        &self.timers
    }
}
