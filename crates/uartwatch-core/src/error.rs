//! Watcher errors

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for an unsupported baud rate (EINVAL)
pub const EXIT_UNSUPPORTED_RATE: u8 = 22;

/// Exit status for a serial device that cannot be opened or configured (ENODEV)
pub const EXIT_SERIAL_INIT: u8 = 19;

/// Exit status for an initial log target that cannot be opened (EBADF)
pub const EXIT_LOG_OPEN: u8 = 9;

/// Exit status for an invalid configuration (EX_CONFIG)
pub const EXIT_CONFIG: u8 = 78;

/// Errors that can occur while watching a serial console
#[derive(Error, Debug)]
pub enum WatchError {
    /// Baud rate outside the supported table
    #[error("Unsupported rate {0}")]
    UnsupportedBaudRate(u32),

    /// Device path longer than the accepted bound
    #[error("Device path too long ({len} bytes, max {max})")]
    DevicePathTooLong {
        /// Length of the rejected path
        len: usize,
        /// Longest accepted length
        max: usize,
    },

    /// Device could not be opened or configured
    #[error("Serial port error: {0}")]
    SerialError(String),

    /// Log file could not be opened
    #[error("Openlog error for {}: {source}", path.display())]
    LogOpen {
        /// File that failed to open
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Invalid setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file is not valid JSON for the settings layout
    #[error("Invalid configuration file: {0}")]
    ConfigFile(#[from] serde_json::Error),

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WatchError {
    /// Process exit status for this error when it aborts startup
    pub fn exit_code(&self) -> u8 {
        match self {
            WatchError::UnsupportedBaudRate(_) => EXIT_UNSUPPORTED_RATE,
            WatchError::SerialError(_) => EXIT_SERIAL_INIT,
            WatchError::LogOpen { .. } => EXIT_LOG_OPEN,
            WatchError::DevicePathTooLong { .. }
            | WatchError::Config(_)
            | WatchError::ConfigFile(_) => EXIT_CONFIG,
            WatchError::IoError(_) => 1,
        }
    }
}
