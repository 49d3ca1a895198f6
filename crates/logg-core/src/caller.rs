//! Caller location capture.
//!
//! Emit methods are `#[track_caller]`, so the location of the user's call
//! site arrives as a `std::panic::Location`. A [`CallerLocator`] turns it (and
//! the logger's configured call depth) into the `file:line` pair rendered in
//! front of the message. The locator is injectable so embedders that wrap the
//! logger in their own helpers can resolve a different frame.
//!
//! Depth counts frames the same way for every locator: at
//! [`DEFAULT_CALL_DEPTH`] the direct caller of the emit method is reported,
//! each extra level moves one frame further out.

use std::panic::Location;
use std::path::Path;

use crate::record::CallSite;

/// Default number of frames between the user's call and the emit method
pub const DEFAULT_CALL_DEPTH: usize = 2;

/// Resolves the call site rendered before a message
pub trait CallerLocator: Send + Sync {
    /// `origin` is the tracked caller of the emit method; `depth` is the
    /// logger's configured call depth.
    fn locate(&self, origin: &'static Location<'static>, depth: usize) -> CallSite;
}

/// Uses the `#[track_caller]` location directly and ignores the depth.
///
/// Cheap, and exact for code that calls the logger itself. Use
/// [`BacktraceLocator`] when messages are emitted through wrapper functions.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackCallerLocator;

impl CallerLocator for TrackCallerLocator {
    fn locate(&self, origin: &'static Location<'static>, _depth: usize) -> CallSite {
        CallSite {
            file: basename(origin.file()),
            line: origin.line(),
        }
    }
}

/// Default locator: honours the call depth by walking the stack.
///
/// At the default depth (or below) it answers from the tracked location
/// without touching the stack. Deeper requests find the frame executing the
/// tracked call, then step outwards one frame per extra level. When debug
/// info is missing or the frame cannot be matched, it falls back to the
/// tracked location.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceLocator;

impl CallerLocator for BacktraceLocator {
    fn locate(&self, origin: &'static Location<'static>, depth: usize) -> CallSite {
        if depth > DEFAULT_CALL_DEPTH {
            if let Some(site) = walk_out(origin, depth - DEFAULT_CALL_DEPTH) {
                return site;
            }
        }
        TrackCallerLocator.locate(origin, depth)
    }
}

/// Resolve the logical frame `extra` levels outside the one at `origin`.
fn walk_out(origin: &'static Location<'static>, extra: usize) -> Option<CallSite> {
    let mut frames: Vec<(String, u32)> = Vec::new();
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
                frames.push((file.to_string_lossy().into_owned(), line));
            }
        });
        true
    });

    let start = frames.iter().position(|(file, line)| {
        *line == origin.line() && Path::new(file).ends_with(origin.file())
    })?;
    let (file, line) = frames.get(start + extra)?;
    Some(CallSite {
        file: basename(file),
        line: *line,
    })
}

fn basename(file: &str) -> String {
    Path::new(file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}
