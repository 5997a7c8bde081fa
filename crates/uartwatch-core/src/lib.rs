//! # uartwatch Core Library
//!
//! Core functionality for the uartwatch serial-console watcher.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Serial channel access with a fixed baud-rate table
//! - Line framing of raw serial reads (and hex dumps in diagnostic mode)
//! - Prompt recognition driving an automatic login script
//! - An outbound command queue drained once per read cycle
//! - A timestamped journal with period-based log rotation
//!
//! ## Example
//!
//! ```rust,ignore
//! use uartwatch_core::prelude::*;
//! use uartwatch_core::serial::port::open_port;
//!
//! let config = WatcherConfig::default();
//! config.validate()?;
//!
//! let mut journal = Journal::new(&config.log);
//! journal.start()?;
//! let channel = open_port(&config.serial)?;
//!
//! let mut session = Session::new(&config, channel, journal);
//! let stats = session.run(&shutdown_flag);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod framing;
pub mod journal;
pub mod login;
pub mod serial;
pub mod session;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::config::{LineEnding, Profile, WatcherConfig};
    pub use crate::error::WatchError;
    pub use crate::framing::{hex_dump, LineFramer, TextBuffer, TextRecord};
    pub use crate::journal::{Journal, LogSink, RotationPeriod};
    pub use crate::login::{LoginState, OutboundQueue, PromptRecognizer};
    pub use crate::serial::{BaudRate, CommunicationChannel, SerialChannel};
    pub use crate::session::{Session, SessionStats};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
