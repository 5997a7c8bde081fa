//! Serial Channel
//!
//! The duplex byte transport between the watcher and the remote console.

mod baud;
mod channel;
pub mod port;

use std::time::Duration;

pub use baud::{BaudRate, SUPPORTED_RATES};
pub use channel::{CommunicationChannel, SerialChannel};
pub use port::{list_ports, open_port, PortInfo};

/// Default device on the reference board
pub const DEFAULT_DEVICE: &str = "/dev/ttyAMA3";

/// Longest accepted device path in bytes
pub const MAX_DEVICE_PATH: usize = 255;

/// How long a read waits before returning control to the loop.
///
/// A timed-out read is not an error; it only lets the loop notice a
/// shutdown request while the peer is silent.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Size of a single read from the channel
pub const READ_CHUNK_SIZE: usize = 2048;
