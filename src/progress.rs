//! # Progress — Atomic Search Progress Counters
//!
//! Thread-safe progress tracking shared between pool workers and the
//! background status reporter. Workers bump lock-free counters as they test
//! exponents and finish chunks; the `current` string is behind a Mutex and is
//! only touched once per chunk.
//!
//! ## Background Reporter
//!
//! A dedicated thread logs tested/found counts, chunk completion, rate and
//! elapsed time at a fixed interval. It polls the shutdown flag every 100 ms so
//! [`Progress::stop`] followed by a join returns promptly.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

const POLL: Duration = Duration::from_millis(100);

pub struct Progress {
    pub tested: AtomicU64,
    pub found: AtomicU64,
    pub chunks_done: AtomicU64,
    pub chunks_total: AtomicU64,
    pub current: Mutex<String>,
    start: Instant,
    shutdown: AtomicBool,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            tested: AtomicU64::new(0),
            found: AtomicU64::new(0),
            chunks_done: AtomicU64::new(0),
            chunks_total: AtomicU64::new(0),
            current: Mutex::new(String::new()),
            start: Instant::now(),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn start_reporter(self: &Arc<Self>, interval: Duration) -> thread::JoinHandle<()> {
        let progress = Arc::clone(self);
        thread::spawn(move || {
            let mut last = Instant::now();
            while !progress.shutdown.load(Ordering::Relaxed) {
                thread::sleep(POLL);
                if last.elapsed() >= interval {
                    progress.print_status();
                    last = Instant::now();
                }
            }
        })
    }

    pub fn set_current(&self, current: String) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = current;
        }
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let tested = self.tested.load(Ordering::Relaxed);
        let found = self.found.load(Ordering::Relaxed);
        let done = self.chunks_done.load(Ordering::Relaxed);
        let total = self.chunks_total.load(Ordering::Relaxed);
        let current = self
            .current
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default();
        let rate = if elapsed.as_secs() > 0 {
            tested as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        info!(
            current = %current,
            tested,
            found,
            chunks = format_args!("{}/{}", done, total),
            rate = format_args!("{:.2}", rate),
            elapsed = format_args!("{:02}:{:02}:{:02}", h, m, s),
            "search progress"
        );
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
