//! Period-based log file rotation

use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::WatchError;

/// Calendar bucket that names a log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPeriod {
    /// ISO 8601 week number (1-53)
    #[default]
    Week,
    /// Day of the year (1-366)
    Day,
    /// Month of the year (1-12)
    Month,
}

impl RotationPeriod {
    /// Period identifier for `now`
    pub fn key(self, now: &DateTime<Local>) -> u32 {
        match self {
            RotationPeriod::Week => now.iso_week().week(),
            RotationPeriod::Day => now.ordinal(),
            RotationPeriod::Month => now.month(),
        }
    }
}

impl std::str::FromStr for RotationPeriod {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(RotationPeriod::Week),
            "day" => Ok(RotationPeriod::Day),
            "month" => Ok(RotationPeriod::Month),
            other => Err(WatchError::Config(format!(
                "unknown rotation period '{}'",
                other
            ))),
        }
    }
}

/// Log file currently receiving lines
struct LogTarget {
    path: PathBuf,
    file: File,
}

/// Keeps one append-mode log file open per rotation period
pub struct LogRotator {
    base: PathBuf,
    period: RotationPeriod,
    /// Last committed period; `None` until the first successful open
    current: Option<u32>,
    target: Option<LogTarget>,
    rotations: u64,
}

impl LogRotator {
    /// Rotator with no file open yet
    pub fn new(base: impl Into<PathBuf>, period: RotationPeriod) -> Self {
        Self {
            base: base.into(),
            period,
            current: None,
            target: None,
            rotations: 0,
        }
    }

    /// File name for period `key` at time `now`.
    ///
    /// strftime specifiers in the base are expanded first; a base that does
    /// not form a valid format string is used literally.
    pub fn target_path(&self, now: &DateTime<Local>, key: u32) -> PathBuf {
        let mut name = self.base.clone().into_os_string();
        let base = self.base.to_string_lossy();
        if base.contains('%') {
            let mut expanded = String::new();
            if write!(expanded, "{}", now.format(&base)).is_ok() {
                name = expanded.into();
            }
        }
        name.push(format!(".{:02}", key));
        PathBuf::from(name)
    }

    /// Open the file for the current period if the period changed.
    ///
    /// Returns the new path when a rotation happened. On failure the
    /// previous file stays open and the period is not committed, so the
    /// next call tries again.
    pub fn check(&mut self, now: &DateTime<Local>) -> Result<Option<&Path>, WatchError> {
        let key = self.period.key(now);
        if self.current == Some(key) {
            return Ok(None);
        }

        let path = self.target_path(now, key);
        debug!(current = ?self.current, key, path = %path.display(), "rotating log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| WatchError::LogOpen {
                path: path.clone(),
                source,
            })?;

        if let Some(old) = self.target.replace(LogTarget { path, file }) {
            info!(path = %old.path.display(), "closing log");
        }
        self.current = Some(key);
        self.rotations += 1;

        Ok(self.target.as_ref().map(|t| t.path.as_path()))
    }

    /// Append one already formatted line to the open file
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        if let Some(target) = self.target.as_mut() {
            writeln!(target.file, "{}", line)?;
            target.file.flush()?;
        }
        Ok(())
    }

    /// Path of the open file
    pub fn current_path(&self) -> Option<&Path> {
        self.target.as_ref().map(|t| t.path.as_path())
    }

    /// Committed period identifier
    pub fn current_key(&self) -> Option<u32> {
        self.current
    }

    /// Number of files opened so far
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Close the open file
    pub fn close(&mut self) {
        self.target = None;
    }
}
