//! Wall-clock source
//!
//! Journal timestamps and rotation periods both read the time through
//! [`Clock`] so tests can pin it.

use chrono::{DateTime, Local};
use std::cell::Cell;
use std::rc::Rc;

/// Source of local wall-clock time
pub trait Clock {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A manually advanced clock for tests and replays.
///
/// Clones share the same instant, so a test can keep a handle and move
/// time forward while a session owns another clone.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<Local>>>,
}

impl FixedClock {
    /// Create a clock frozen at `at`
    pub fn new(at: DateTime<Local>) -> Self {
        Self {
            now: Rc::new(Cell::new(at)),
        }
    }

    /// Move the clock to `at`
    pub fn set(&self, at: DateTime<Local>) {
        self.now.set(at);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}
