//! Bounded text accumulator

/// Bytes that must stay free after every append
pub const SPARE_MARGIN: usize = 2;

/// Upper bound on the up-front allocation; the rest grows on demand
const INITIAL_ALLOCATION: usize = 256;

/// Append-only byte accumulator with a hard capacity.
///
/// The length never exceeds `capacity - SPARE_MARGIN`; the caller flushes
/// when [`TextBuffer::would_overflow`] reports the margin would be breached.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl TextBuffer {
    /// Create an empty buffer holding at most `capacity - SPARE_MARGIN` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(SPARE_MARGIN + 1);
        Self {
            bytes: Vec::with_capacity(capacity.min(INITIAL_ALLOCATION)),
            capacity,
        }
    }

    /// Whether appending one more byte would leave less than the margin free
    pub fn would_overflow(&self) -> bool {
        self.bytes.len() + 1 + SPARE_MARGIN > self.capacity
    }

    /// Append a byte. Callers check [`TextBuffer::would_overflow`] first.
    pub fn push(&mut self, byte: u8) {
        debug_assert!(!self.would_overflow());
        self.bytes.push(byte);
    }

    /// Remove and return the accumulated bytes
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }

    /// Discard the accumulated bytes
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Accumulated bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of accumulated bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been accumulated since the last take
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
