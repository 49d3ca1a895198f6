//! Shared test sinks

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use logg_core::{Level, LogError, Result, Sink};
use parking_lot::{Condvar, Mutex};

/// What a [`RecordingSink`] has seen
#[derive(Default)]
pub struct Recorded {
    pub lines: Mutex<Vec<(Level, String)>>,
    pub flushes: AtomicUsize,
    pub destroys: AtomicUsize,
}

impl Recorded {
    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

/// Sink that remembers every message it receives
pub struct RecordingSink {
    recorded: Arc<Recorded>,
    floor: Level,
    label: Option<String>,
}

impl RecordingSink {
    pub fn new(floor: Level) -> (Box<dyn Sink>, Arc<Recorded>) {
        let recorded = Arc::new(Recorded::default());
        let sink = RecordingSink {
            recorded: Arc::clone(&recorded),
            floor,
            label: None,
        };
        (Box::new(sink), recorded)
    }

    /// Sink that records `"<label>: <msg>"` into a log shared with others
    pub fn shared(label: &str, floor: Level, recorded: &Arc<Recorded>) -> Box<dyn Sink> {
        Box::new(RecordingSink {
            recorded: Arc::clone(recorded),
            floor,
            label: Some(label.to_string()),
        })
    }
}

impl Sink for RecordingSink {
    fn init(&mut self, _config: &str) -> Result<()> {
        Ok(())
    }

    fn write_msg(&self, _when: DateTime<Local>, msg: &str, level: Level) -> Result<()> {
        if level.passes(self.floor) {
            let line = match &self.label {
                Some(label) => format!("{}: {}", label, msg),
                None => msg.to_string(),
            };
            self.recorded.lines.lock().push((level, line));
        }
        Ok(())
    }

    fn flush(&self) {
        self.recorded.flushes.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(self: Box<Self>) {
        self.recorded.destroys.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink whose writes always fail
pub struct FailingSink;

impl Sink for FailingSink {
    fn init(&mut self, _config: &str) -> Result<()> {
        Ok(())
    }

    fn write_msg(&self, _when: DateTime<Local>, _msg: &str, _level: Level) -> Result<()> {
        Err(LogError::Io(std::io::Error::other("disk on fire")))
    }

    fn flush(&self) {}

    fn destroy(self: Box<Self>) {}
}

/// Sink that blocks every write until the gate is opened
pub struct GatedSink {
    gate: Arc<Gate>,
    recorded: Arc<Recorded>,
}

#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn open(&self) {
        *self.open.lock() = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cond.wait(&mut open);
        }
    }
}

impl GatedSink {
    pub fn new() -> (Box<dyn Sink>, Arc<Gate>, Arc<Recorded>) {
        let gate = Arc::new(Gate::default());
        let recorded = Arc::new(Recorded::default());
        let sink = GatedSink {
            gate: Arc::clone(&gate),
            recorded: Arc::clone(&recorded),
        };
        (Box::new(sink), gate, recorded)
    }
}

impl Sink for GatedSink {
    fn init(&mut self, _config: &str) -> Result<()> {
        Ok(())
    }

    fn write_msg(&self, _when: DateTime<Local>, msg: &str, level: Level) -> Result<()> {
        self.gate.wait();
        self.recorded.lines.lock().push((level, msg.to_string()));
        Ok(())
    }

    fn flush(&self) {
        self.recorded.flushes.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(self: Box<Self>) {
        self.recorded.destroys.fetch_add(1, Ordering::SeqCst);
    }
}

/// Poll `check` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    check()
}
