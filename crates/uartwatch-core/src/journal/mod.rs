//! Journal
//!
//! Timestamped log of everything the watcher sees and does. Every line goes
//! to the console; lines are also appended to the rotating log file while
//! one is open.

mod rotation;

use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;

pub use rotation::{LogRotator, RotationPeriod};

use crate::clock::{Clock, SystemClock};
use crate::config::LogSettings;
use crate::error::WatchError;

/// Timestamp layout prefixed to every line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Destination for journal lines
pub trait LogSink {
    /// Append one line. The text is data and is never interpreted.
    fn append_line(&mut self, text: &str);

    /// Give the sink a chance to roll over its target; returns true on rotation
    fn check_rotation(&mut self) -> bool {
        false
    }
}

/// Format `now` the way journal lines are prefixed
pub fn timestamp(now: &DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Console plus rotating-file journal
pub struct Journal<C: Clock = SystemClock> {
    clock: C,
    rotator: LogRotator,
    console: Box<dyn Write>,
}

impl Journal<SystemClock> {
    /// Journal on the system clock writing to stdout
    pub fn new(settings: &LogSettings) -> Self {
        Self::with_parts(settings, SystemClock, Box::new(io::stdout()))
    }
}

impl<C: Clock> Journal<C> {
    /// Journal with an explicit clock and console writer.
    ///
    /// No file is open until [`Journal::start`] succeeds; until then lines
    /// only reach the console.
    pub fn with_parts(settings: &LogSettings, clock: C, console: Box<dyn Write>) -> Self {
        Self {
            clock,
            rotator: LogRotator::new(settings.base_path.clone(), settings.rotation),
            console,
        }
    }

    /// Open the log file for the current period. Failure here is fatal to the caller.
    pub fn start(&mut self) -> Result<(), WatchError> {
        let now = self.clock.now();
        self.rotator.check(&now)?;
        Ok(())
    }

    /// Path of the open log file
    pub fn current_path(&self) -> Option<&Path> {
        self.rotator.current_path()
    }

    /// Number of log files opened so far
    pub fn rotations(&self) -> u64 {
        self.rotator.rotations()
    }

    /// Close the log file; later lines reach the console only
    pub fn close(&mut self) {
        self.rotator.close();
    }

    fn console_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.console, "{}", line).and_then(|_| self.console.flush()) {
            warn!("console write failed: {}", e);
        }
    }
}

impl<C: Clock> LogSink for Journal<C> {
    fn append_line(&mut self, text: &str) {
        let line = format!("{}: {}", timestamp(&self.clock.now()), text);
        self.console_line(&line);
        if let Err(e) = self.rotator.write_line(&line) {
            warn!("log file write failed: {}", e);
        }
    }

    fn check_rotation(&mut self) -> bool {
        let now = self.clock.now();
        match self.rotator.check(&now) {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                // The file path may be what is broken, so report on the console only
                let line = format!("{}: Rotation failed: {}", timestamp(&now), e);
                self.console_line(&line);
                false
            }
        }
    }
}
