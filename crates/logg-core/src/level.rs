//! Severity levels.
//!
//! Lower ordinal means more severe. A message at `level` passes a threshold
//! `t` when `level <= t`, so `Debug` (the loosest threshold) lets everything
//! through and `Fatal` only lets fatal messages through.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Log severity, ordered from most to least severe
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Level {
    /// Unrecoverable condition
    Fatal = 0,
    /// Operation failed
    Error = 1,
    /// Something looks wrong but work continues
    Warn = 2,
    /// Normal progress
    Info = 3,
    /// Developer detail
    #[default]
    Debug = 4,
}

impl Level {
    /// All levels, most severe first
    pub const ALL: [Level; 5] = [
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
    ];

    /// Whether a message at this level passes `threshold`
    #[inline]
    pub fn passes(self, threshold: Level) -> bool {
        self <= threshold
    }

    /// Three-character tag written in front of every message, e.g. `[W]`
    pub fn tag(self) -> &'static str {
        match self {
            Level::Fatal => "[F]",
            Level::Error => "[E]",
            Level::Warn => "[W]",
            Level::Info => "[I]",
            Level::Debug => "[D]",
        }
    }

    /// Lowercase name as used in config files
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Fatal => "fatal",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level as u8
    }
}

impl TryFrom<u8> for Level {
    type Error = LogError;

    fn try_from(value: u8) -> Result<Self, LogError> {
        Level::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| LogError::Config(format!("level {} out of range 0..=4", value)))
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, LogError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fatal" => Ok(Level::Fatal),
            "error" => Ok(Level::Error),
            "warn" | "warning" => Ok(Level::Warn),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            other => Err(LogError::Config(format!("unknown level name '{}'", other))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
