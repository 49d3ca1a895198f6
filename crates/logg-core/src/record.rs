//! Log records and the free list that recycles them.
//!
//! A record is built once at emit time and read by every sink during fan-out.
//! In async mode the worker hands spent records back to a [`RecordPool`] so the
//! next emit can reuse the text buffer instead of allocating a fresh one.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::level::Level;

/// A single rendered log message
#[derive(Debug, Clone)]
pub struct LogRecord {
    when: DateTime<Local>,
    level: Level,
    text: String,
}

impl LogRecord {
    /// Create a record from already rendered text
    pub fn new(when: DateTime<Local>, level: Level, text: impl Into<String>) -> Self {
        Self {
            when,
            level,
            text: text.into(),
        }
    }

    /// When the message was emitted
    pub fn when(&self) -> DateTime<Local> {
        self.when
    }

    /// Severity of the message
    pub fn level(&self) -> Level {
        self.level
    }

    /// Rendered message, including the level tag and optional caller location
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Caller location rendered between the level tag and the message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// File name without directories
    pub file: String,
    /// Line number, 0 when unknown
    pub line: u32,
}

impl CallSite {
    /// Placeholder used when the locator cannot resolve a frame
    pub fn unknown() -> Self {
        Self {
            file: "???".to_string(),
            line: 0,
        }
    }
}

/// Render `[T][file:line] message` into `buf`, replacing its contents.
pub(crate) fn render_into(
    buf: &mut String,
    level: Level,
    site: Option<&CallSite>,
    args: fmt::Arguments<'_>,
) {
    buf.clear();
    buf.push_str(level.tag());
    if let Some(site) = site {
        // Writing into a String cannot fail
        let _ = write!(buf, "[{}:{}]", site.file, site.line);
    }
    buf.push(' ');
    let _ = buf.write_fmt(args);
}

/// Bounded free list of spent records
pub struct RecordPool {
    free: Mutex<Vec<LogRecord>>,
    limit: usize,
}

impl RecordPool {
    /// Create a pool that keeps at most `limit` idle records
    pub fn new(limit: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(limit)),
            limit,
        }
    }

    /// Build a record, reusing an idle buffer when one is available
    pub fn acquire(
        &self,
        when: DateTime<Local>,
        level: Level,
        site: Option<&CallSite>,
        args: fmt::Arguments<'_>,
    ) -> LogRecord {
        let mut record = match self.free.lock().pop() {
            Some(mut spent) => {
                spent.when = when;
                spent.level = level;
                spent
            }
            None => LogRecord::new(when, level, String::new()),
        };
        render_into(&mut record.text, level, site, args);
        record
    }

    /// Return a spent record; dropped if the pool is already full
    pub fn release(&self, record: LogRecord) {
        let mut free = self.free.lock();
        if free.len() < self.limit {
            free.push(record);
        }
    }

    /// Number of idle records currently held
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_site() {
        let mut buf = String::from("stale");
        render_into(&mut buf, Level::Info, None, format_args!("hello {}", 42));
        assert_eq!(buf, "[I] hello 42");
    }

    #[test]
    fn test_render_with_site() {
        let site = CallSite {
            file: "main.rs".into(),
            line: 12,
        };
        let mut buf = String::new();
        render_into(&mut buf, Level::Warn, Some(&site), format_args!("disk low"));
        assert_eq!(buf, "[W][main.rs:12] disk low");
    }

    #[test]
    fn test_pool_reuses_buffers() {
        let pool = RecordPool::new(2);
        let now = Local::now();

        let first = pool.acquire(
            now,
            Level::Debug,
            None,
            format_args!("a fairly long first message"),
        );
        let capacity = first.text.capacity();
        pool.release(first);
        assert_eq!(pool.idle(), 1);

        let second = pool.acquire(now, Level::Error, None, format_args!("short"));
        assert_eq!(pool.idle(), 0);
        assert_eq!(second.text(), "[E] short");
        assert_eq!(second.level(), Level::Error);
        assert!(second.text.capacity() >= capacity);
    }

    #[test]
    fn test_pool_is_bounded() {
        let pool = RecordPool::new(1);
        let now = Local::now();
        pool.release(LogRecord::new(now, Level::Info, "one"));
        pool.release(LogRecord::new(now, Level::Info, "two"));
        assert_eq!(pool.idle(), 1);
    }
}
