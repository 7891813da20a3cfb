#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use quick_event::{Client, Dispatcher, Handler};

/// Worker threads driving a dispatcher until told to stop. Each worker
/// counts its completed dispatch passes.
pub struct Workers {
    stop: Arc<AtomicBool>,
    pub ticks: Vec<Arc<AtomicUsize>>,
    handles: Vec<JoinHandle<()>>,
}

pub fn spawn_workers<H: Handler>(core: &Arc<Dispatcher<H>>, n: usize) -> Workers {
    let stop = Arc::new(AtomicBool::new(false));
    let mut ticks = Vec::new();
    let mut handles = Vec::new();

    for _ in 0..n {
        let core = core.clone();
        let stop = stop.clone();
        let count = Arc::new(AtomicUsize::new(0));
        ticks.push(count.clone());

        handles.push(thread::spawn(move || {
            let id = core.register_thread();

            while !stop.load(Ordering::Acquire) {
                core.dispatch_one(id);
                count.fetch_add(1, Ordering::AcqRel);
            }
        }));
    }

    Workers {
        stop,
        ticks,
        handles,
    }
}

impl Workers {
    pub fn stop(self) {
        self.stop.store(true, Ordering::Release);

        for h in self.handles {
            h.join().unwrap();
        }
    }
}

pub fn wait_for<F: Fn() -> bool>(what: &str, cond: F) {
    let deadline = Instant::now() + Duration::from_secs(10);

    while !cond() {
        if Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        thread::sleep(Duration::from_millis(10));
    }
}

/// Stashes a client reference as a raw address so test threads outside the
/// hooks can reach it.
#[derive(Default)]
pub struct ClientSlot(AtomicUsize);

impl ClientSlot {
    pub fn new() -> ClientSlot {
        ClientSlot(AtomicUsize::new(0))
    }

    pub fn set<T>(&self, client: &Client<T>) {
        self.0.store(client as *const _ as usize, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst) != 0
    }

    /// The record must not have been released yet: keep the dispatcher's
    /// workers from ticking past the close, or avoid closing, while the
    /// reference is live.
    pub unsafe fn get<'a, T>(&self) -> &'a Client<T> {
        let addr = self.0.load(Ordering::SeqCst);
        assert_ne!(addr, 0, "no client stashed");
        &*(addr as *const Client<T>)
    }
}

/// Writes a fresh self-signed certificate and key pair under the target
/// tmp dir, for TLS listener tests.
pub fn self_signed_cert(tag: &str) -> (PathBuf, PathBuf) {
    use openssl::asn1::Asn1Time;
    use openssl::bn::{BigNum, MsbOption};
    use openssl::hash::MessageDigest;
    use openssl::pkey::PKey;
    use openssl::rsa::Rsa;
    use openssl::x509::{X509NameBuilder, X509};

    let rsa = Rsa::generate(2048).unwrap();
    let key = PKey::from_rsa(rsa).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "localhost").unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = {
        let mut bn = BigNum::new().unwrap();
        bn.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
        bn.to_asn1_integer().unwrap()
    };
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(1).unwrap())
        .unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    let cert = builder.build();

    let dir = std::env::temp_dir();
    let cert_path = dir.join(format!("quick-event-{}-{}.crt", tag, std::process::id()));
    let key_path = dir.join(format!("quick-event-{}-{}.key", tag, std::process::id()));

    fs::write(&cert_path, cert.to_pem().unwrap()).unwrap();
    fs::write(&key_path, key.private_key_to_pem_pkcs8().unwrap()).unwrap();

    (cert_path, key_path)
}
