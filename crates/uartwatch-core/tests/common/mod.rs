#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use uartwatch_core::journal::LogSink;
use uartwatch_core::serial::CommunicationChannel;

/// Mock serial port: replays scripted reads and captures writes
pub struct MockSerial {
    reads: VecDeque<io::Result<Vec<u8>>>,
    pub sent: Vec<u8>,
    pub writes: Vec<String>,
    pub fail_on_send: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            reads: VecDeque::new(),
            sent: Vec::new(),
            writes: Vec::new(),
            fail_on_send: false,
        }
    }

    pub fn with_chunks(chunks: &[&[u8]]) -> Self {
        let mut mock = Self::new();
        for chunk in chunks {
            mock.push_chunk(chunk);
        }
        mock
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.reads.push_back(Ok(chunk.to_vec()));
    }

    pub fn push_error(&mut self, kind: io::ErrorKind) {
        self.reads.push_back(Err(io::Error::new(kind, "mock read failure")));
    }
}

impl Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reads.pop_front() {
            Some(Ok(chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            Some(Err(e)) => Err(e),
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
        }
    }
}

impl Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_on_send {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "Serial write failed"));
        }
        self.sent.extend_from_slice(buf);
        self.writes.push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CommunicationChannel for MockSerial {
    fn name(&self) -> String {
        "mock".to_string()
    }
}

/// Sink collecting journal lines in memory
#[derive(Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl LogSink for MemorySink {
    fn append_line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}
