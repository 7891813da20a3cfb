use std::io;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use openssl::ssl::{ErrorCode, Ssl, SslContext, SslMethod, SslStream, SslVerifyMode};

use quick_event::{Client, Dispatcher, Handler, ReadToken};

mod common;

struct TlsEcho {
    new_count: Arc<AtomicUsize>,
    close_count: Arc<AtomicUsize>,
    read_before_new: Arc<AtomicBool>,
}

impl Handler for TlsEcho {
    type Data = ();

    fn on_new(&self, _core: &Dispatcher<Self>, _client: &Client<()>) {
        self.new_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_read(&self, core: &Dispatcher<Self>, client: &Client<()>, _token: &ReadToken) -> bool {
        if self.new_count.load(Ordering::SeqCst) == 0 {
            self.read_before_new.store(true, Ordering::SeqCst);
        }

        let mut buf = [0u8; 4096];

        loop {
            match core.read(client, &mut buf) {
                Ok(0) => return false,
                Ok(n) => {
                    if core.write(client, &buf[..n]).is_err() {
                        return false;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return true,
                Err(_) => return false,
            }
        }
    }

    fn on_close(&self, _client: &Client<()>) {
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }
}

fn client_session(port: u16) -> SslStream<TcpStream> {
    let mut builder = SslContext::builder(SslMethod::tls()).unwrap();
    builder.set_verify(SslVerifyMode::NONE);
    let ctx = builder.build();

    let tcp = TcpStream::connect(("127.0.0.1", port)).unwrap();
    tcp.set_nonblocking(true).unwrap();

    let ssl = Ssl::new(&ctx).unwrap();
    SslStream::new(ssl, tcp).unwrap()
}

fn want_more(e: &openssl::ssl::Error) -> bool {
    matches!(e.code(), ErrorCode::WANT_READ | ErrorCode::WANT_WRITE)
}

/// The handshake is dribbled out over a non-blocking client with long
/// stalls, so the server has to make progress across several wakeups.
/// `on_new` must fire exactly once, only after negotiation finishes, and
/// no read hook may run before it.
#[test]
fn staged_handshake_announces_once() {
    let new_count = Arc::new(AtomicUsize::new(0));
    let close_count = Arc::new(AtomicUsize::new(0));
    let read_before_new = Arc::new(AtomicBool::new(false));

    let (cert, key) = common::self_signed_cert("staged");

    let core = Arc::new(
        Dispatcher::new(
            TlsEcho {
                new_count: new_count.clone(),
                close_count: close_count.clone(),
                read_before_new: read_before_new.clone(),
            },
            Vec::new(),
        )
        .unwrap(),
    );

    core.listen_tls(
        "127.0.0.1",
        5500,
        cert.to_str().unwrap(),
        key.to_str().unwrap(),
    )
    .unwrap();

    let workers = common::spawn_workers(&core, 4);

    let mut session = client_session(5500);

    // First flight only, then stall: the server must sit in the
    // handshaking state without announcing the client.
    let stalled = match session.connect() {
        Ok(()) => false,
        Err(e) if want_more(&e) => true,
        Err(e) => panic!("handshake failed: {}", e),
    };

    if stalled {
        thread::sleep(Duration::from_millis(150));
        assert_eq!(new_count.load(Ordering::SeqCst), 0);
    }

    while let Err(e) = session.connect() {
        if !want_more(&e) {
            panic!("handshake failed: {}", e);
        }
        thread::sleep(Duration::from_millis(20));
    }

    common::wait_for("the client to be announced", || {
        new_count.load(Ordering::SeqCst) == 1
    });

    // Echo a record through the negotiated session.
    loop {
        match session.ssl_write(b"test") {
            Ok(4) => break,
            Ok(n) => panic!("partial TLS write of {}", n),
            Err(e) if want_more(&e) => thread::sleep(Duration::from_millis(5)),
            Err(e) => panic!("TLS write failed: {}", e),
        }
    }

    let mut buf = [0u8; 4];
    let mut got = 0;
    while got < 4 {
        match session.ssl_read(&mut buf[got..]) {
            Ok(0) => panic!("peer closed before echoing"),
            Ok(n) => got += n,
            Err(e) if want_more(&e) => thread::sleep(Duration::from_millis(5)),
            Err(e) => panic!("TLS read failed: {}", e),
        }
    }
    assert_eq!(&buf, b"test");

    drop(session);

    common::wait_for("the record to be released", || {
        close_count.load(Ordering::SeqCst) == 1
    });

    thread::sleep(Duration::from_millis(300));
    assert_eq!(new_count.load(Ordering::SeqCst), 1);
    assert_eq!(close_count.load(Ordering::SeqCst), 1);
    assert!(!read_before_new.load(Ordering::SeqCst));

    workers.stop();
}

/// A client that aborts mid-handshake: the connection dies quietly, with
/// neither announcement nor close hook.
#[test]
fn aborted_handshake_stays_silent() {
    let new_count = Arc::new(AtomicUsize::new(0));
    let close_count = Arc::new(AtomicUsize::new(0));
    let read_before_new = Arc::new(AtomicBool::new(false));

    let (cert, key) = common::self_signed_cert("aborted");

    let core = Arc::new(
        Dispatcher::new(
            TlsEcho {
                new_count: new_count.clone(),
                close_count: close_count.clone(),
                read_before_new: read_before_new.clone(),
            },
            Vec::new(),
        )
        .unwrap(),
    );

    core.listen_tls(
        "127.0.0.1",
        5501,
        cert.to_str().unwrap(),
        key.to_str().unwrap(),
    )
    .unwrap();

    let workers = common::spawn_workers(&core, 2);

    let mut session = client_session(5501);

    match session.connect() {
        // One-round completion over loopback would make this a normal
        // connection; only the stalled case is interesting.
        Ok(()) => {
            workers.stop();
            return;
        }
        Err(e) if want_more(&e) => {}
        Err(e) => panic!("handshake failed: {}", e),
    }

    // Walk away mid-negotiation.
    drop(session);

    thread::sleep(Duration::from_millis(500));

    assert_eq!(new_count.load(Ordering::SeqCst), 0);
    assert_eq!(close_count.load(Ordering::SeqCst), 0);
    assert!(!read_before_new.load(Ordering::SeqCst));

    workers.stop();
}
