//! Process-wide table of sink constructors.
//!
//! The built-in `console` and `file` sinks are present from the first lookup.
//! Further sinks are added once, at startup, with [`register_sink`]. Entries
//! are never removed.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::console::ConsoleSink;
use crate::error::{LogError, Result};
use crate::file::FileSink;
use crate::sink::{Sink, SinkConstructor};

/// Registry name of the console sink
pub const CONSOLE: &str = "console";
/// Registry name of the rotating file sink
pub const FILE: &str = "file";

fn new_console() -> Box<dyn Sink> {
    Box::new(ConsoleSink::new())
}

fn new_file() -> Box<dyn Sink> {
    Box::new(FileSink::new())
}

fn registry() -> &'static RwLock<HashMap<String, SinkConstructor>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, SinkConstructor>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut table: HashMap<String, SinkConstructor> = HashMap::new();
        table.insert(CONSOLE.to_string(), new_console as SinkConstructor);
        table.insert(FILE.to_string(), new_file as SinkConstructor);
        RwLock::new(table)
    })
}

/// Register a sink constructor under `name`.
///
/// Meant to be called once per sink type during startup; a second
/// registration of the same name fails so the caller can abort early.
pub fn register_sink(name: &str, constructor: SinkConstructor) -> Result<()> {
    let mut table = registry().write();
    if table.contains_key(name) {
        return Err(LogError::DuplicateSink(name.to_string()));
    }
    table.insert(name.to_string(), constructor);
    tracing::debug!(sink = name, "registered sink constructor");
    Ok(())
}

/// Whether a constructor is registered under `name`
pub fn is_registered(name: &str) -> bool {
    registry().read().contains_key(name)
}

/// Construct a fresh, uninitialized sink of type `name`
pub(crate) fn construct(name: &str) -> Result<Box<dyn Sink>> {
    let constructor = registry()
        .read()
        .get(name)
        .copied()
        .ok_or_else(|| LogError::UnknownSink(name.to_string()))?;
    Ok(constructor())
}
