//! Rotating file sink.
//!
//! The live file always sits at the configured path. Before a write, the sink
//! checks whether the file has reached `maxsize` bytes or was opened on a
//! different day of the month; if so it renames the live file to an archive
//! name and reopens a fresh one at the same path.
//!
//! ```text
//! logs/app.log                    live file
//! logs/app_2026-01-21_001.log     size rotation (maxsize > 0), first free number
//! logs/app_2026-01-20.log         day rotation (maxsize == 0)
//! ```
//!
//! Archives carry the date the live file was opened, for size and day
//! rotation alike, so one archive name never mixes two opening days. With
//! `daily` off, a long-lived file keeps its opening date until it rotates.
//!
//! Rotation and the write that follows happen under one mutex, so concurrent
//! writers never see a half-swapped handle. After a successful rotation a
//! background thread deletes archives older than `maxdays` days.
//!
//! A failed rotation (no free archive name, rename error) is reported once and
//! not retried until the next day. The lines in between stay in the live file
//! and are archived under the day of the failure.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, NaiveDate};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::console::TIME_FORMAT;
use crate::error::{LogError, Result};
use crate::level::Level;
use crate::retention::{sweep_expired, RetentionPolicy};
use crate::sink::Sink;

/// Highest numeric suffix probed for size-based archive names
pub const MAX_ARCHIVE_NUMBER: u32 = 999;

/// Extension used for archives when the live file has none
const DEFAULT_SUFFIX: &str = ".log";

/// JSON configuration of the file sink
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    /// Live log file path (required)
    pub filename: String,
    /// Rotate once the live file holds this many bytes; 0 disables
    pub maxsize: u64,
    /// Rotate when the day of month changes
    pub daily: bool,
    /// Delete archives older than this many days; 0 disables
    #[serde(alias = "maxday")]
    pub maxdays: u32,
    /// Master switch for rotation
    pub rotate: bool,
    /// Severity floor
    #[serde(alias = "Level")]
    pub level: Level,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            filename: String::new(),
            maxsize: 0,
            daily: true,
            maxdays: 0,
            rotate: true,
            level: Level::Debug,
        }
    }
}

impl FileSinkConfig {
    /// Config for `filename` with every other field at its default
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }
}

/// Open handle plus the bookkeeping that decides when to rotate
struct LiveFile {
    file: Option<File>,
    size: u64,
    opened: NaiveDate,
    /// Day on which a rotation failed; no retry until it passes
    stalled: Option<NaiveDate>,
}

/// Writes messages to a file, rotating by size and by day
pub struct FileSink {
    config: FileSinkConfig,
    path: PathBuf,
    /// Path without extension, e.g. `logs/app`
    base: String,
    /// Extension including the dot, e.g. `.log`
    suffix: String,
    live: Mutex<Option<LiveFile>>,
}

impl FileSink {
    /// Unconfigured sink; [`Sink::init`] must run before use
    pub fn new() -> Self {
        Self {
            config: FileSinkConfig::default(),
            path: PathBuf::new(),
            base: String::new(),
            suffix: DEFAULT_SUFFIX.to_string(),
            live: Mutex::new(None),
        }
    }

    /// Build and open a sink from a typed config
    pub fn open(config: FileSinkConfig) -> Result<Self> {
        let mut sink = Self::new();
        sink.apply(config)?;
        Ok(sink)
    }

    /// Path of the live file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active configuration
    pub fn config(&self) -> &FileSinkConfig {
        &self.config
    }

    /// Bytes the sink believes the live file holds
    pub fn current_size(&self) -> u64 {
        self.live.lock().as_ref().map(|live| live.size).unwrap_or(0)
    }

    fn apply(&mut self, config: FileSinkConfig) -> Result<()> {
        if config.filename.is_empty() {
            return Err(LogError::Config("file sink config must have filename".into()));
        }

        let (base, suffix) = split_suffix(&config.filename);
        self.path = PathBuf::from(&config.filename);
        self.base = base;
        self.suffix = suffix;
        self.config = config;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let fresh = self.open_live(Local::now().date_naive())?;
        *self.live.lock() = Some(fresh);
        Ok(())
    }

    fn open_live(&self, opened: NaiveDate) -> Result<LiveFile> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o660);
        }
        let file = options.open(&self.path)?;
        let size = file.metadata()?.len();
        Ok(LiveFile {
            file: Some(file),
            size,
            opened,
            stalled: None,
        })
    }

    fn needs_rotate(&self, live: &LiveFile, when: DateTime<Local>) -> bool {
        if live.stalled == Some(when.date_naive()) {
            return false;
        }
        let by_size = self.config.maxsize > 0 && live.size >= self.config.maxsize;
        let by_day = self.config.daily && when.day() != live.opened.day();
        by_size || by_day
    }

    /// First unused archive name for a file opened on `date`
    fn archive_path(&self, date: NaiveDate) -> Result<PathBuf> {
        let date = date.format("%Y-%m-%d");
        if self.config.maxsize > 0 {
            (1..=MAX_ARCHIVE_NUMBER)
                .map(|n| PathBuf::from(format!("{}_{}_{:03}{}", self.base, date, n, self.suffix)))
                .find(|candidate| !exists(candidate))
                .ok_or_else(|| {
                    LogError::rotation(&self.path, "can not find free log number to rename")
                })
        } else {
            let candidate = PathBuf::from(format!("{}_{}{}", self.base, date, self.suffix));
            if exists(&candidate) {
                Err(LogError::rotation(
                    &self.path,
                    format!("archive {} already exists", candidate.display()),
                ))
            } else {
                Ok(candidate)
            }
        }
    }

    fn rotate(&self, live: &mut LiveFile, when: DateTime<Local>) -> Result<()> {
        fs::symlink_metadata(&self.path)
            .map_err(|e| LogError::rotation(&self.path, format!("stat live file: {e}")))?;
        let archive = self.archive_path(live.opened)?;

        // Close before renaming; some platforms refuse to rename open files
        drop(live.file.take());
        let renamed = fs::rename(&self.path, &archive);

        *live = self
            .open_live(when.date_naive())
            .map_err(|e| LogError::rotation(&self.path, format!("reopen: {e}")))?;
        renamed.map_err(|e| LogError::rotation(&self.path, format!("rename: {e}")))?;

        tracing::debug!(
            path = %self.path.display(),
            archive = %archive.display(),
            "rotated log file"
        );
        self.spawn_sweep();
        Ok(())
    }

    fn spawn_sweep(&self) {
        if self.config.maxdays == 0 {
            return;
        }
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let prefix = Path::new(&self.base)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let policy = RetentionPolicy::days(
            dir,
            prefix,
            self.suffix.clone(),
            self.config.maxdays,
            self.path.clone(),
        );

        let spawned = thread::Builder::new()
            .name("logg-sweep".into())
            .spawn(move || {
                sweep_expired(&policy, SystemTime::now());
            });
        if let Err(e) = spawned {
            tracing::error!("unable to start retention sweep: {}", e);
        }
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for FileSink {
    fn init(&mut self, config: &str) -> Result<()> {
        let parsed: FileSinkConfig = serde_json::from_str(config)?;
        self.apply(parsed)
    }

    fn write_msg(&self, when: DateTime<Local>, msg: &str, level: Level) -> Result<()> {
        if !level.passes(self.config.level) {
            return Ok(());
        }
        let line = format!("{} {}\n", when.format(TIME_FORMAT), msg);

        let mut guard = self.live.lock();
        let live = guard
            .as_mut()
            .ok_or_else(|| LogError::Config("file sink used before init".into()))?;

        if self.config.rotate && self.needs_rotate(live, when) {
            if let Err(e) = self.rotate(live, when) {
                tracing::error!(path = %self.path.display(), "{}", e);
                live.opened = when.date_naive();
                live.stalled = Some(when.date_naive());
            }
        }

        let file = live.file.as_mut().ok_or_else(|| {
            LogError::rotation(&self.path, "no open handle after failed rotation")
        })?;
        file.write_all(line.as_bytes())?;
        live.size += line.len() as u64;
        Ok(())
    }

    fn flush(&self) {
        if let Some(file) = self.live.lock().as_mut().and_then(|live| live.file.as_mut()) {
            if let Err(e) = file.sync_all() {
                tracing::warn!(path = %self.path.display(), "file flush failed: {}", e);
            }
        }
    }

    fn destroy(self: Box<Self>) {
        if let Some(live) = self.live.lock().take() {
            drop(live.file);
        }
    }
}

fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Split `logs/app.log` into (`logs/app`, `.log`).
///
/// A name without extension keeps the whole name as base and archives with
/// the default `.log` suffix.
fn split_suffix(filename: &str) -> (String, String) {
    match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let suffix = format!(".{ext}");
            let base = filename
                .strip_suffix(suffix.as_str())
                .unwrap_or(filename)
                .to_string();
            (base, suffix)
        }
        None => (filename.to_string(), DEFAULT_SUFFIX.to_string()),
    }
}
