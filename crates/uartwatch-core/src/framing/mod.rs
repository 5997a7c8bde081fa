//! Line Framing
//!
//! Converts raw serial reads into text records, or into hex/ASCII dump
//! lines when the watcher runs in diagnostic mode.

mod buffer;
mod hexdump;
mod lines;

pub use buffer::{TextBuffer, SPARE_MARGIN};
pub use hexdump::{hex_dump, BYTES_PER_LINE};
pub use lines::{LineFramer, TextRecord};
