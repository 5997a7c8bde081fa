//! Outbound command queue

use std::collections::VecDeque;

/// FIFO of commands waiting to be written to the console.
///
/// Recognition enqueues while a read chunk is processed; the event loop
/// drains the queue once the whole chunk has been recognized.
#[derive(Debug, Clone, Default)]
pub struct OutboundQueue {
    entries: VecDeque<String>,
}

impl OutboundQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command at the tail
    pub fn enqueue(&mut self, text: impl Into<String>) {
        self.entries.push_back(text.into());
    }

    /// Remove the command at the head
    pub fn dequeue(&mut self) -> Option<String> {
        self.entries.pop_front()
    }

    /// Peek at the command that would be sent next
    pub fn front(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    /// Number of commands waiting
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is waiting to be sent
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
