//! Console sink with optional ANSI coloring.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::Result;
use crate::level::Level;
use crate::sink::Sink;

/// Timestamp layout shared by every built-in sink
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// ANSI color code per level, indexed by level ordinal
const COLORS: [&str; 5] = [
    "1;35", // fatal
    "1;31", // error
    "1;33", // warn
    "1;34", // info
    "1;34", // debug
];

/// Wrap `text` in the ANSI color for `level`
pub fn paint(level: Level, text: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", COLORS[level as usize], text)
}

/// Serializing line writer shared by console sinks.
///
/// Each call writes one `timestamp message\n` line while holding the lock, so
/// lines from concurrent writers never interleave.
pub struct LineWriter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl LineWriter {
    /// Wrap an arbitrary writer
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Process-wide writer for stdout
    pub fn stdout() -> Arc<LineWriter> {
        use std::sync::OnceLock;
        static STDOUT: OnceLock<Arc<LineWriter>> = OnceLock::new();
        STDOUT
            .get_or_init(|| Arc::new(LineWriter::new(io::stdout())))
            .clone()
    }

    /// Write a single timestamped line
    pub fn println(&self, when: DateTime<Local>, msg: &str) -> io::Result<()> {
        let line = format!("{} {}\n", when.format(TIME_FORMAT), msg);
        let mut out = self.out.lock();
        out.write_all(line.as_bytes())
    }

    /// Flush the underlying writer
    pub fn flush(&self) -> io::Result<()> {
        self.out.lock().flush()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConsoleConfig {
    #[serde(alias = "Level")]
    level: Level,
    color: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            level: Level::Debug,
            color: !cfg!(windows),
        }
    }
}

/// Writes messages to stdout (or any [`LineWriter`])
pub struct ConsoleSink {
    out: Arc<LineWriter>,
    level: Level,
    colorful: bool,
}

impl ConsoleSink {
    /// Console sink on stdout with default settings
    pub fn new() -> Self {
        Self::with_writer(LineWriter::stdout())
    }

    /// Console sink writing to a caller-provided writer
    pub fn with_writer(out: Arc<LineWriter>) -> Self {
        let defaults = ConsoleConfig::default();
        Self {
            out,
            level: defaults.level,
            colorful: defaults.color,
        }
    }

    /// Severity floor of this sink
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn init(&mut self, config: &str) -> Result<()> {
        if config.trim().is_empty() {
            return Ok(());
        }
        let parsed: ConsoleConfig = serde_json::from_str(config)?;
        self.level = parsed.level;
        self.colorful = parsed.color && !cfg!(windows);
        Ok(())
    }

    fn write_msg(&self, when: DateTime<Local>, msg: &str, level: Level) -> Result<()> {
        if !level.passes(self.level) {
            return Ok(());
        }
        if self.colorful {
            self.out.println(when, &paint(level, msg))?;
        } else {
            self.out.println(when, msg)?;
        }
        Ok(())
    }

    fn flush(&self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!("console flush failed: {}", e);
        }
    }

    fn destroy(self: Box<Self>) {}
}
