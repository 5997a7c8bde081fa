use std::borrow::Cow;

use super::TextBuffer;

/// One completed line of console output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    /// Line content without terminator and without `\r`
    pub bytes: Vec<u8>,
    /// The record was cut because the buffer ran out of room, not by a terminator
    pub split: bool,
    /// A prompt rule already fired on this line while it was still open
    pub handled: bool,
}

impl TextRecord {
    /// Lossy UTF-8 view of the line
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Turns raw serial reads into completed text records.
///
/// `\r` is dropped, `\n` and NUL end a record, everything else is
/// accumulated. A record that would breach the buffer margin is emitted
/// early and continues in the next record.
pub struct LineFramer {
    buffer: TextBuffer,
    /// Set when the open line already triggered a prompt rule
    pending_handled: bool,
}

impl LineFramer {
    /// Framer whose records hold at most `capacity - SPARE_MARGIN` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: TextBuffer::with_capacity(capacity),
            pending_handled: false,
        }
    }

    /// Feed one read chunk, returning the records it completed in order
    pub fn push(&mut self, bytes: &[u8]) -> Vec<TextRecord> {
        let mut records = Vec::new();

        for &b in bytes {
            match b {
                b'\r' => {}
                b'\n' | 0 => records.push(self.flush(false)),
                _ => {
                    if self.buffer.would_overflow() {
                        records.push(self.flush(true));
                    }
                    self.buffer.push(b);
                }
            }
        }

        records
    }

    fn flush(&mut self, split: bool) -> TextRecord {
        let handled = std::mem::replace(&mut self.pending_handled, false);
        TextRecord {
            bytes: self.buffer.take(),
            split,
            handled,
        }
    }

    /// Bytes of the line that is still open
    pub fn pending(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Lossy UTF-8 view of the open line
    pub fn pending_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.buffer.as_bytes())
    }

    /// Whether a prompt rule already fired on the open line
    pub fn pending_handled(&self) -> bool {
        self.pending_handled
    }

    /// Remember that the open line already triggered a prompt rule
    pub fn mark_pending_handled(&mut self) {
        self.pending_handled = true;
    }

    /// Drop the open line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending_handled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(records: &[TextRecord]) -> Vec<String> {
        records.iter().map(|r| r.text().into_owned()).collect()
    }

    #[test]
    fn test_lines_simple() {
        let mut framer = LineFramer::new(64);
        let records = framer.push(b"Hello\nWorld\n");
        assert_eq!(texts(&records), vec!["Hello", "World"]);
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn test_lines_split_across_reads() {
        let mut framer = LineFramer::new(64);
        assert!(framer.push(b"Hel").is_empty());
        let records = framer.push(b"lo\n");
        assert_eq!(texts(&records), vec!["Hello"]);
    }

    #[test]
    fn test_crlf_and_nul() {
        let mut framer = LineFramer::new(64);
        let records = framer.push(b"a\r\nb\0c\r");
        assert_eq!(texts(&records), vec!["a", "b"]);
        assert_eq!(framer.pending(), b"c");
    }

    #[test]
    fn test_overflow_splits_record() {
        // capacity 6 leaves room for 4 bytes per record
        let mut framer = LineFramer::new(6);
        let records = framer.push(b"abcdefghij\n");
        assert_eq!(texts(&records), vec!["abcd", "efgh", "ij"]);
        assert!(records[0].split);
        assert!(records[1].split);
        assert!(!records[2].split);
    }

    #[test]
    fn test_handled_flag_moves_to_record() {
        let mut framer = LineFramer::new(64);
        framer.push(b"emak login: ");
        framer.mark_pending_handled();
        let records = framer.push(b"emak\nnext\n");
        assert!(records[0].handled);
        assert!(!records[1].handled);
        assert!(!framer.pending_handled());
    }
}
