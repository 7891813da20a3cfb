use std::collections::VecDeque;
use std::mem;
use std::sync::Mutex;

/// The identity a worker thread receives from [`Wqueue::register`] and
/// passes back on every tick.
#[derive(Debug, Clone, Copy)]
pub struct TickId(u64);

/// A two-bucket deferred-free queue.
///
/// There have to be two buckets at all times: one collects whatever is
/// closed during the current tick, and it cannot be drained until the
/// following tick has also completed. A worker that picked up a reference
/// just before an item was queued may still be using it through the whole
/// next tick; once every registered thread has checked in twice after the
/// add, no live reference can remain and the item is handed to the free
/// callback.
pub struct Wqueue<T> {
    inner: Mutex<Inner<T>>,
    free_fn: Box<dyn Fn(T) + Send + Sync>,
}

struct Inner<T> {
    buckets: [VecDeque<T>; 2],
    curr: usize,
    threads: u32,
    threads_mask: u64,
    checked_in: u64,
}

impl<T> Wqueue<T> {
    pub fn new<F>(free_fn: F) -> Wqueue<T>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Wqueue {
            inner: Mutex::new(Inner {
                buckets: [VecDeque::new(), VecDeque::new()],
                curr: 0,
                threads: 0,
                threads_mask: 0,
                checked_in: 0,
            }),
            free_fn: Box::new(free_fn),
        }
    }

    /// Issues the calling thread its check-in bit. The bit is permanent:
    /// a registered thread must keep ticking for the queue to rotate.
    pub fn register(&self) -> TickId {
        let mut inner = self.inner.lock().unwrap();

        assert!(inner.threads < 64, "wqueue supports at most 64 threads");

        let bit = 1u64 << inner.threads;
        inner.threads += 1;
        inner.threads_mask |= bit;

        TickId(bit)
    }

    pub fn add(&self, item: T) {
        let mut inner = self.inner.lock().unwrap();
        let curr = inner.curr;
        inner.buckets[curr].push_back(item);
    }

    /// Checks the thread in for this tick. When every registered thread
    /// has checked in, the buckets rotate and the one that sat out the
    /// whole previous tick is freed, outside the lock.
    pub fn tick(&self, id: TickId) {
        let drained = {
            let mut inner = self.inner.lock().unwrap();

            inner.checked_in |= id.0;

            if inner.checked_in == inner.threads_mask {
                inner.checked_in = 0;

                // The bucket rotating back into service has been out of
                // reach for one full tick; swap a fresh one in and empty
                // it once the lock is released.
                inner.curr = (inner.curr + 1) % 2;
                let curr = inner.curr;
                Some(mem::take(&mut inner.buckets[curr]))
            } else {
                None
            }
        };

        if let Some(items) = drained {
            for item in items {
                (self.free_fn)(item);
            }
        }
    }

    /// A debugging hook: frees everything queued immediately, regardless
    /// of the consequences.
    pub fn flush(&self) {
        let drained = {
            let mut inner = self.inner.lock().unwrap();
            let a = mem::take(&mut inner.buckets[0]);
            let b = mem::take(&mut inner.buckets[1]);
            (a, b)
        };

        for item in drained.0.into_iter().chain(drained.1) {
            (self.free_fn)(item);
        }
    }
}
