use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

use libc::{self, c_int};
use libc::{EPOLLERR, EPOLLET, EPOLLHUP, EPOLLIN, EPOLLPRI, EPOLLRDHUP};

/// The interest set every descriptor is armed with: readable plus remote
/// hang-up, edge-triggered so N threads can share the instance without
/// thundering on the same fd.
const READ_EVENTS: u32 = (EPOLLIN | EPOLLRDHUP | EPOLLET) as u32;

pub struct Epoll {
    epfd: RawFd,
}

impl Epoll {
    pub fn new() -> io::Result<Epoll> {
        let epfd = syscall!(epoll_create1(libc::EPOLL_CLOEXEC))?;

        Ok(Epoll { epfd })
    }

    /// Waits for up to the capacity of `evts` events. Returns the number of
    /// events received; `0` means the timeout elapsed.
    pub fn wait(&self, evts: &mut Events, timeout_ms: c_int) -> io::Result<usize> {
        let cnt = syscall!(epoll_wait(
            self.epfd,
            evts.events.as_mut_ptr(),
            evts.events.capacity() as i32,
            timeout_ms
        ))?;

        unsafe { evts.events.set_len(cnt as usize) };

        Ok(cnt as usize)
    }

    pub fn add(&self, fd: RawFd, tag: u64) -> io::Result<()> {
        let mut info = libc::epoll_event {
            events: READ_EVENTS,
            u64: tag,
        };

        syscall!(epoll_ctl(self.epfd, libc::EPOLL_CTL_ADD, fd, &mut info))?;

        Ok(())
    }

    /// Re-arms an existing registration so the next readiness transition is
    /// reported again.
    pub fn modify(&self, fd: RawFd, tag: u64) -> io::Result<()> {
        let mut info = libc::epoll_event {
            events: READ_EVENTS,
            u64: tag,
        };

        syscall!(epoll_ctl(self.epfd, libc::EPOLL_CTL_MOD, fd, &mut info))?;

        Ok(())
    }
}

impl AsRawFd for Epoll {
    fn as_raw_fd(&self) -> RawFd {
        self.epfd
    }
}

impl Drop for Epoll {
    fn drop(&mut self) {
        unsafe {
            let _ = libc::close(self.epfd);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Event {
    tag: u64,
    kind: u32,
}

impl Event {
    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn is_readable(&self) -> bool {
        let kind = self.kind as c_int;
        (kind & EPOLLIN) != 0 || (kind & EPOLLPRI) != 0
    }

    pub fn is_hup(&self) -> bool {
        let kind = self.kind as c_int;
        (kind & EPOLLRDHUP) != 0 || (kind & EPOLLHUP) != 0
    }

    pub fn is_error(&self) -> bool {
        (self.kind as c_int & EPOLLERR) != 0
    }
}

pub struct Events {
    events: Vec<libc::epoll_event>,
}

impl Events {
    pub fn with_capacity(u: usize) -> Events {
        Events {
            events: Vec::with_capacity(u),
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<Event> {
        self.events.get(idx).map(|event| Event {
            tag: event.u64,
            kind: event.events,
        })
    }
}
