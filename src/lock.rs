use std::hint;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

/// A reader-preferring spin-based read/write lock.
///
/// Readers take an optimistic reference and back off if a writer slipped in
/// between their two checks of the writer word; the writer claims its flag
/// first, then waits out the remaining readers. Writer-exclusive but not
/// starvation-free, which is acceptable for the short critical sections
/// this is meant to guard.
///
/// # Examples
///
/// ```
/// use quick_event::RwLock;
///
/// let lock = RwLock::new();
///
/// {
///     let _r = lock.read();
///     let _r2 = lock.read();
/// }
///
/// let _w = lock.write();
/// ```
#[derive(Debug, Default)]
pub struct RwLock {
    readers: AtomicU32,
    writer: AtomicU32,
}

impl RwLock {
    pub const fn new() -> RwLock {
        RwLock {
            readers: AtomicU32::new(0),
            writer: AtomicU32::new(0),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_> {
        loop {
            if self.writer.load(Ordering::Acquire) == 0 {
                self.readers.fetch_add(1, Ordering::Acquire);

                // If no writer got in after we took our reference, we hold
                // a valid read lock.
                if self.writer.load(Ordering::Acquire) == 0 {
                    return RwLockReadGuard { lock: self };
                }

                self.readers.fetch_sub(1, Ordering::Release);
            }

            thread::yield_now();
        }
    }

    pub fn write(&self) -> RwLockWriteGuard<'_> {
        while self
            .writer
            .compare_exchange(0, 1, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            hint::spin_loop();
        }

        // New readers see the writer word and back off; wait for the ones
        // already inside.
        while self.readers.load(Ordering::Acquire) != 0 {
            hint::spin_loop();
        }

        RwLockWriteGuard { lock: self }
    }
}

pub struct RwLockReadGuard<'a> {
    lock: &'a RwLock,
}

impl Drop for RwLockReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.readers.fetch_sub(1, Ordering::Release);
    }
}

pub struct RwLockWriteGuard<'a> {
    lock: &'a RwLock,
}

impl Drop for RwLockWriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.writer.store(0, Ordering::Release);
    }
}
