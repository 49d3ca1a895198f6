//! logg: leveled logging with pluggable sinks
//!
//! Messages are emitted through a [`Logger`] and fanned out to every attached
//! [`Sink`], either inline on the caller's thread or through a background
//! dispatch worker.
//!
//! ## Overview
//!
//! - **Levels**: `Fatal < Error < Warn < Info < Debug`; a message passes a
//!   threshold when it is at least as severe.
//! - **Sinks**: `console` and a rotating `file` sink are built in; further
//!   types are added with [`register_sink`].
//! - **Async mode**: a bounded queue feeds a single worker thread. A full
//!   queue blocks producers instead of dropping messages.
//! - **Rotation**: the file sink rolls over by size or day and sweeps old
//!   archives in the background.
//!
//! ## Quick Start
//!
//! ```ignore
//! use logg_core::{log_info, log_warn, Logger};
//!
//! let logger = Logger::new(128);
//! logger.set_sink("console", r#"{"level":4}"#)?;
//! logger.set_sink("file", r#"{"filename":"logs/app.log","maxsize":1048576,"maxdays":7}"#)?;
//! logger.start_async()?;
//!
//! log_info!(logger, "service started on port {}", 8080);
//! log_warn!(logger, "cache miss ratio {:.2}", 0.41);
//!
//! logger.flush();
//! logger.close();
//! ```

pub mod caller;
pub mod config;
pub mod console;
mod dispatch;
pub mod error;
pub mod file;
pub mod level;
pub mod logger;
mod macros;
pub mod record;
pub mod registry;
pub mod retention;
pub mod sink;

// Re-exports
pub use caller::{BacktraceLocator, CallerLocator, TrackCallerLocator, DEFAULT_CALL_DEPTH};
pub use config::{AppenderSpec, IniConfig, LoggerConfig};
pub use console::{ConsoleSink, LineWriter};
pub use error::{LogError, Result};
pub use file::{FileSink, FileSinkConfig};
pub use level::Level;
pub use logger::{Logger, DEFAULT_QUEUE_LEN};
pub use record::{CallSite, LogRecord, RecordPool};
pub use registry::{is_registered, register_sink};
pub use retention::{sweep_expired, RetentionPolicy};
pub use sink::{Sink, SinkConstructor};
