//! The contract every output destination implements.

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::level::Level;

/// A pluggable destination for log output.
///
/// Sinks are shared between producer threads (sync mode) and the dispatch
/// worker (async mode), so `write_msg` and `flush` take `&self` and each
/// implementation serializes its own output.
pub trait Sink: Send + Sync {
    /// Apply a JSON configuration payload.
    ///
    /// Called exactly once, before the sink is attached to a logger.
    fn init(&mut self, config: &str) -> Result<()>;

    /// Persist one rendered message.
    ///
    /// Returns `Ok(())` without writing when `level` is less severe than the
    /// sink's own floor.
    fn write_msg(&self, when: DateTime<Local>, msg: &str, level: Level) -> Result<()>;

    /// Push buffered output to durable storage, best effort.
    fn flush(&self);

    /// Release owned resources. Consumes the sink so it runs once.
    fn destroy(self: Box<Self>);
}

/// Constructor stored in the sink registry
pub type SinkConstructor = fn() -> Box<dyn Sink>;

/// A sink attached to a logger under a unique label
pub(crate) struct NamedSink {
    pub(crate) name: String,
    pub(crate) sink: Box<dyn Sink>,
}

/// Deliver one message to every sink in order.
///
/// A failing sink is reported and skipped; the others still get the message.
pub(crate) fn fan_out(sinks: &[NamedSink], when: DateTime<Local>, msg: &str, level: Level) {
    for out in sinks {
        if let Err(e) = out.sink.write_msg(when, msg, level) {
            tracing::error!(sink = %out.name, "unable to write message to sink: {}", e);
        }
    }
}

/// Flush every sink in order.
pub(crate) fn flush_all(sinks: &[NamedSink]) {
    for out in sinks {
        out.sink.flush();
    }
}

/// Flush, then destroy, every sink, leaving the list empty.
pub(crate) fn destroy_all(sinks: &mut Vec<NamedSink>) {
    flush_all(sinks);
    for out in sinks.drain(..) {
        tracing::debug!(sink = %out.name, "destroying sink");
        out.sink.destroy();
    }
}
