//! The logger facade.
//!
//! A [`Logger`] holds the logger-wide threshold and the ordered list of
//! attached sinks. It starts in synchronous mode, where every emit fans out
//! on the caller's thread. [`Logger::start_async`] switches it to the
//! dispatch engine, after which emits only enqueue.
//!
//! Emit calls never fail: messages below the threshold are dropped before
//! formatting, and sink failures are reported through `tracing` without
//! reaching the caller.

use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Local;
use parking_lot::RwLock;

use crate::caller::{BacktraceLocator, CallerLocator, DEFAULT_CALL_DEPTH};
use crate::config::LoggerConfig;
use crate::dispatch::{Dispatcher, SharedSinks};
use crate::error::{LogError, Result};
use crate::level::Level;
use crate::record::render_into;
use crate::registry;
use crate::sink::{destroy_all, fan_out, flush_all, NamedSink, Sink};

/// Default capacity of the async queue
pub const DEFAULT_QUEUE_LEN: usize = 128;

enum Mode {
    Sync,
    Async(Dispatcher),
    Closed,
}

/// Leveled logger with pluggable sinks
pub struct Logger {
    level: AtomicU8,
    caller: AtomicBool,
    call_depth: AtomicUsize,
    locator: Box<dyn CallerLocator>,
    queue_len: usize,
    sinks: SharedSinks,
    mode: RwLock<Mode>,
}

impl Logger {
    /// Create a synchronous logger whose async queue, once started, holds
    /// `queue_len` pending messages.
    pub fn new(queue_len: usize) -> Self {
        Self {
            level: AtomicU8::new(Level::Debug.into()),
            caller: AtomicBool::new(false),
            call_depth: AtomicUsize::new(DEFAULT_CALL_DEPTH),
            locator: Box::new(BacktraceLocator),
            queue_len,
            sinks: Arc::new(RwLock::new(Vec::new())),
            mode: RwLock::new(Mode::Sync),
        }
    }

    /// Replace the caller locator
    pub fn with_locator(mut self, locator: impl CallerLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Logger-wide threshold
    pub fn level(&self) -> Level {
        Level::try_from(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Set the logger-wide threshold
    pub fn set_level(&self, level: Level) {
        self.level.store(level.into(), Ordering::Relaxed);
    }

    /// Whether a message at `level` would pass the logger-wide threshold
    pub fn enabled(&self, level: Level) -> bool {
        level.passes(self.level())
    }

    /// Prefix messages with the caller's `file:line`
    pub fn enable_caller(&self, enabled: bool) {
        self.caller.store(enabled, Ordering::Relaxed);
    }

    /// Frame offset handed to the caller locator
    pub fn call_depth(&self) -> usize {
        self.call_depth.load(Ordering::Relaxed)
    }

    /// Set the frame offset handed to the caller locator.
    ///
    /// With the default locator, depth 2 reports the direct caller of the
    /// emit method and each extra level one frame further out.
    pub fn set_call_depth(&self, depth: usize) {
        self.call_depth.store(depth, Ordering::Relaxed);
    }

    /// Construct a registered sink type and attach it under its type name.
    pub fn set_sink(&self, kind: &str, config: &str) -> Result<()> {
        self.set_sink_as(kind, kind, config)
    }

    /// Construct a registered sink type and attach it under `label`.
    ///
    /// Labels are unique per logger; attach several sinks of one type with
    /// distinct labels.
    pub fn set_sink_as(&self, label: &str, kind: &str, config: &str) -> Result<()> {
        {
            let mode = self.mode.read();
            if matches!(*mode, Mode::Closed) {
                return Err(LogError::Closed);
            }
            if self.sinks.read().iter().any(|s| s.name == label) {
                return Err(LogError::DuplicateSink(label.to_string()));
            }
        }
        let mut sink = registry::construct(kind)?;
        sink.init(config).map_err(|e| LogError::SinkInit {
            name: label.to_string(),
            source: Box::new(e),
        })?;
        self.attach_sink(label, sink)
    }

    /// Attach an already initialized sink under `label`.
    ///
    /// On error the sink is destroyed before returning.
    pub fn attach_sink(&self, label: &str, sink: Box<dyn Sink>) -> Result<()> {
        // Held until the push so close cannot drain the list in between
        let mode = self.mode.read();
        if matches!(*mode, Mode::Closed) {
            drop(mode);
            sink.destroy();
            return Err(LogError::Closed);
        }
        let mut sinks = self.sinks.write();
        if sinks.iter().any(|s| s.name == label) {
            drop(sinks);
            drop(mode);
            sink.destroy();
            return Err(LogError::DuplicateSink(label.to_string()));
        }
        sinks.push(NamedSink {
            name: label.to_string(),
            sink,
        });
        tracing::debug!(sink = label, "attached sink");
        Ok(())
    }

    /// Labels of attached sinks in fan-out order
    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.read().iter().map(|s| s.name.clone()).collect()
    }

    /// Apply an INI file: threshold, caller capture and sinks.
    pub fn load_config(&self, path: impl AsRef<Path>) -> Result<()> {
        self.apply_config(&LoggerConfig::load(path)?)
    }

    /// Apply an already parsed configuration
    pub fn apply_config(&self, config: &LoggerConfig) -> Result<()> {
        if let Some(level) = config.level {
            self.set_level(level);
        }
        if let Some(caller) = config.caller {
            self.enable_caller(caller);
        }
        for spec in &config.appenders {
            self.set_sink_as(&spec.label, &spec.kind, &spec.config)?;
        }
        Ok(())
    }

    /// Switch to asynchronous mode, spawning the dispatch worker.
    ///
    /// Calling it again while already async is a no-op; there is never more
    /// than one worker per logger.
    pub fn start_async(&self) -> Result<()> {
        let mut mode = self.mode.write();
        match *mode {
            Mode::Sync => {
                let dispatcher = Dispatcher::start(Arc::clone(&self.sinks), self.queue_len)?;
                *mode = Mode::Async(dispatcher);
                Ok(())
            }
            Mode::Async(_) => Ok(()),
            Mode::Closed => Err(LogError::Closed),
        }
    }

    /// Whether emits go through the dispatch engine
    pub fn is_async(&self) -> bool {
        matches!(*self.mode.read(), Mode::Async(_))
    }

    /// Whether [`Logger::close`] has run
    pub fn is_closed(&self) -> bool {
        matches!(*self.mode.read(), Mode::Closed)
    }

    /// Log at [`Level::Fatal`]
    #[track_caller]
    pub fn fatal(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Fatal, Location::caller(), args);
    }

    /// Log at [`Level::Error`]
    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, Location::caller(), args);
    }

    /// Log at [`Level::Warn`]
    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, Location::caller(), args);
    }

    /// Log at [`Level::Info`]
    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, Location::caller(), args);
    }

    /// Log at [`Level::Debug`]
    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, Location::caller(), args);
    }

    /// Log at an arbitrary level
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.emit(level, Location::caller(), args);
    }

    fn emit(&self, level: Level, origin: &'static Location<'static>, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let site = self
            .caller
            .load(Ordering::Relaxed)
            .then(|| self.locator.locate(origin, self.call_depth()));
        let when = Local::now();

        match &*self.mode.read() {
            Mode::Sync => {
                let mut text = String::new();
                render_into(&mut text, level, site.as_ref(), args);
                fan_out(&self.sinks.read(), when, &text, level);
            }
            Mode::Async(dispatcher) => {
                let record = dispatcher.pool().acquire(when, level, site.as_ref(), args);
                if let Err(e) = dispatcher.enqueue(record) {
                    tracing::warn!("dropping log message: {}", e);
                }
            }
            Mode::Closed => {}
        }
    }

    /// Deliver everything emitted so far and flush every sink.
    ///
    /// In async mode this blocks until the worker has caught up.
    pub fn flush(&self) {
        match &*self.mode.read() {
            Mode::Sync => flush_all(&self.sinks.read()),
            Mode::Async(dispatcher) => {
                if let Err(e) = dispatcher.flush() {
                    tracing::warn!("flush failed: {}", e);
                }
            }
            Mode::Closed => {}
        }
    }

    /// Drain pending messages, then flush and destroy every sink.
    ///
    /// The logger accepts no further messages or sinks afterwards. Calling it
    /// again is a no-op.
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.mode.write(), Mode::Closed);
        match previous {
            Mode::Sync => destroy_all(&mut self.sinks.write()),
            Mode::Async(dispatcher) => {
                if let Err(e) = dispatcher.close() {
                    tracing::warn!("close failed: {}", e);
                }
            }
            Mode::Closed => {}
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_LEN)
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}
