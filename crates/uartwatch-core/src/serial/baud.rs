//! Baud rate table
//!
//! Only the rates a Linux termios driver can name symbolically are accepted.

use std::str::FromStr;

use crate::error::WatchError;

/// Every rate the watcher can configure, in ascending order
pub const SUPPORTED_RATES: [u32; 30] = [
    50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 38400, 57600,
    115200, 230400, 460800, 500000, 576000, 921600, 1000000, 1152000, 1500000, 2000000, 2500000,
    3000000, 3500000, 4000000,
];

/// A baud rate that exists in [`SUPPORTED_RATES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaudRate(u32);

impl BaudRate {
    /// Resolve a numeric rate against the table
    pub fn from_num(num: u32) -> Result<Self, WatchError> {
        if SUPPORTED_RATES.contains(&num) {
            Ok(Self(num))
        } else {
            Err(WatchError::UnsupportedBaudRate(num))
        }
    }

    /// Bits per second
    pub fn bps(self) -> u32 {
        self.0
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        Self(115200)
    }
}

/// Text that is not a number resolves to rate 0, which the table rejects
impl FromStr for BaudRate {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_num(s.trim().parse().unwrap_or(0))
    }
}
