//! Deletion of expired rotated log files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const SECS_PER_DAY: u64 = 60 * 60 * 24;

/// Which files a sweep may delete
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Directory to scan (not recursive)
    pub dir: PathBuf,
    /// Required file name prefix, the live file's base name
    pub prefix: String,
    /// Required file name suffix, the live file's extension
    pub suffix: String,
    /// Files whose modification time is older than this are expired
    pub max_age: Duration,
    /// Live file of the sink; never deleted, even if it matches
    pub live: PathBuf,
}

impl RetentionPolicy {
    /// Policy keeping files for `days` days
    pub fn days(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        days: u32,
        live: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
            max_age: Duration::from_secs(u64::from(days) * SECS_PER_DAY),
            live: live.into(),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        if path.file_name() == self.live.file_name() {
            return false;
        }
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(&self.prefix) && name.ends_with(&self.suffix))
            .unwrap_or(false)
    }
}

/// Delete every expired file matched by `policy`, returning how many were removed.
///
/// Failures are reported and skipped; a sweep never fails as a whole.
pub fn sweep_expired(policy: &RetentionPolicy, now: SystemTime) -> usize {
    if policy.max_age.is_zero() {
        return 0;
    }
    let cutoff = match now.checked_sub(policy.max_age) {
        Some(cutoff) => cutoff,
        None => return 0,
    };

    let entries = match fs::read_dir(&policy.dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %policy.dir.display(), "unable to scan for old logs: {}", e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !policy.matches(&path) {
            continue;
        }
        let modified = match entry.metadata() {
            Ok(meta) if meta.is_file() => meta.modified(),
            Ok(_) => continue,
            Err(e) => Err(e),
        };
        match modified {
            Ok(mtime) if mtime < cutoff => match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "deleted expired log");
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "unable to delete old log: {}", e)
                }
            },
            Ok(_) => {}
            Err(e) => tracing::warn!(path = %path.display(), "unable to stat old log: {}", e),
        }
    }
    removed
}
