use std::io::Write;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use quick_event::{Client, Dispatcher, Handler, ReadToken};

mod common;

struct Parked {
    in_read: Arc<AtomicBool>,
    parked: Arc<AtomicBool>,
    slot: Arc<common::ClientSlot>,
    close_count: Arc<AtomicUsize>,
    ticks_at_close: Arc<[AtomicUsize; 2]>,
    worker_ticks: Arc<[AtomicUsize; 2]>,
}

impl Handler for Parked {
    type Data = ();

    fn on_new(&self, _core: &Dispatcher<Self>, client: &Client<()>) {
        self.slot.set(client);
    }

    fn on_read(&self, core: &Dispatcher<Self>, client: &Client<()>, _token: &ReadToken) -> bool {
        self.in_read.store(true, Ordering::SeqCst);

        // Sit in the hook until the test lets go, like a worker stuck in a
        // long blocking operation.
        while self.parked.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }

        let mut buf = [0u8; 64];
        let _ = core.read(client, &mut buf);

        false
    }

    fn on_close(&self, _client: &Client<()>) {
        for (at_close, ticks) in self.ticks_at_close.iter().zip(self.worker_ticks.iter()) {
            at_close.store(ticks.load(Ordering::SeqCst), Ordering::SeqCst);
        }
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Worker A sits inside on_read while the client is closed from outside.
/// The record must survive until A has come back and both workers have
/// ticked past the close; only then does the close hook fire.
#[test]
fn parked_reader_delays_release() {
    let in_read = Arc::new(AtomicBool::new(false));
    let parked = Arc::new(AtomicBool::new(true));
    let slot = Arc::new(common::ClientSlot::new());
    let close_count = Arc::new(AtomicUsize::new(0));
    let ticks_at_close = Arc::new([AtomicUsize::new(0), AtomicUsize::new(0)]);
    let worker_ticks = Arc::new([AtomicUsize::new(0), AtomicUsize::new(0)]);

    let core = Arc::new(
        Dispatcher::new(
            Parked {
                in_read: in_read.clone(),
                parked: parked.clone(),
                slot: slot.clone(),
                close_count: close_count.clone(),
                ticks_at_close: ticks_at_close.clone(),
                worker_ticks: worker_ticks.clone(),
            },
            Vec::new(),
        )
        .unwrap(),
    );

    core.listen("127.0.0.1", 5400).unwrap();

    // Two workers whose ticks feed the shared counters the close hook
    // snapshots.
    let stop = Arc::new(AtomicBool::new(false));
    let handles: Vec<_> = (0..2)
        .map(|i| {
            let core = core.clone();
            let stop = stop.clone();
            let worker_ticks = worker_ticks.clone();

            thread::spawn(move || {
                let id = core.register_thread();
                while !stop.load(Ordering::Acquire) {
                    core.dispatch_one(id);
                    worker_ticks[i].fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    let mut stream = TcpStream::connect("127.0.0.1:5400").unwrap();

    common::wait_for("the client to be announced", || slot.is_set());
    stream.write_all(b"poke").unwrap();
    common::wait_for("a worker to park in on_read", || {
        in_read.load(Ordering::SeqCst)
    });

    // Close from outside while one worker is captive in the hook.
    let client = unsafe { slot.get::<()>() };
    core.close(client);

    let before = [
        worker_ticks[0].load(Ordering::SeqCst),
        worker_ticks[1].load(Ordering::SeqCst),
    ];

    // The captive worker cannot tick, so the queue cannot rotate and the
    // record cannot be released, however long we wait.
    thread::sleep(Duration::from_millis(400));
    assert_eq!(close_count.load(Ordering::SeqCst), 0);

    parked.store(false, Ordering::SeqCst);

    common::wait_for("the record to be released", || {
        close_count.load(Ordering::SeqCst) == 1
    });

    // Both workers ticked past the close before the release happened.
    for i in 0..2 {
        assert!(
            ticks_at_close[i].load(Ordering::SeqCst) > before[i],
            "worker {} never ticked between close and release",
            i
        );
    }

    drop(stream);
    stop.store(true, Ordering::Release);
    for h in handles {
        h.join().unwrap();
    }
}
