//! Event loop
//!
//! A [`Session`] owns every piece of watcher state (channel, framer,
//! recognizer, queue, journal) and is driven by a single thread. One cycle
//! reads a chunk, frames and recognizes it, drains the outbound queue into
//! the channel and finally lets the journal rotate.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

use crate::config::WatcherConfig;
use crate::framing::{hex_dump, LineFramer};
use crate::journal::LogSink;
use crate::login::{OutboundQueue, PromptRecognizer, Transition};
use crate::serial::{CommunicationChannel, POLL_INTERVAL, READ_CHUNK_SIZE};

/// Placeholder written to the journal instead of secrets
const MASK: &str = "********";

/// Counters reported when the loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Bytes received from the channel
    pub bytes_read: u64,
    /// Text records completed by the framer
    pub records: u64,
    /// Commands written to the channel
    pub commands_sent: u64,
    /// Failed reads
    pub read_errors: u64,
    /// Failed writes (the command is dropped)
    pub write_errors: u64,
    /// Log rotations after startup
    pub rotations: u64,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes, {} lines, {} commands sent, {} read errors, {} write errors, {} rotations",
            self.bytes_read,
            self.records,
            self.commands_sent,
            self.read_errors,
            self.write_errors,
            self.rotations
        )
    }
}

/// What a single cycle observed on the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// This many bytes were read and processed
    Data(usize),
    /// The read timed out with nothing received
    Idle,
    /// The channel reported end of stream
    Closed,
    /// The read failed; the error was journaled
    ReadError,
}

/// How read chunks are handled; chosen once at startup
enum Mode {
    Lines(LineFramer),
    HexDump,
}

/// The watcher's complete runtime state
pub struct Session<Ch: CommunicationChannel, L: LogSink> {
    channel: Ch,
    sink: L,
    mode: Mode,
    recognizer: PromptRecognizer,
    queue: OutboundQueue,
    match_partial: bool,
    stats: SessionStats,
    read_buf: Vec<u8>,
}

impl<Ch: CommunicationChannel, L: LogSink> Session<Ch, L> {
    /// Build a session from a validated configuration
    pub fn new(config: &WatcherConfig, channel: Ch, sink: L) -> Self {
        let mode = if config.hexdump {
            Mode::HexDump
        } else {
            Mode::Lines(LineFramer::new(config.text_capacity))
        };

        Self {
            channel,
            sink,
            mode,
            recognizer: PromptRecognizer::new(config.profiles.clone(), config.line_ending),
            queue: OutboundQueue::new(),
            match_partial: config.match_partial_lines,
            stats: SessionStats::default(),
            read_buf: vec![0; READ_CHUNK_SIZE],
        }
    }

    /// Whether the session dumps hex instead of framing lines
    pub fn is_hexdump(&self) -> bool {
        matches!(self.mode, Mode::HexDump)
    }

    /// Frame and recognize one chunk, queueing any answers
    pub fn process_chunk(&mut self, chunk: &[u8]) {
        self.stats.bytes_read += chunk.len() as u64;

        let framer = match &mut self.mode {
            Mode::HexDump => {
                for line in hex_dump(chunk) {
                    self.sink.append_line(&line);
                }
                return;
            }
            Mode::Lines(framer) => framer,
        };

        for record in framer.push(chunk) {
            self.stats.records += 1;
            let text = record.text();
            if !text.is_empty() {
                self.sink.append_line(&text);
            }
            if record.handled {
                continue;
            }
            if let Some(t) = self.recognizer.observe(&text) {
                Self::queue_answer(&mut self.queue, &mut self.sink, t);
            }
        }

        // Prompts wait for input without a trailing newline
        if self.match_partial && !framer.pending().is_empty() && !framer.pending_handled() {
            let text = framer.pending_text().into_owned();
            if let Some(t) = self.recognizer.observe(&text) {
                framer.mark_pending_handled();
                Self::queue_answer(&mut self.queue, &mut self.sink, t);
            }
        }
    }

    fn queue_answer(queue: &mut OutboundQueue, sink: &mut L, t: Transition) {
        let shown = if t.is_secret() {
            MASK.to_string()
        } else {
            t.command.trim_end().to_string()
        };
        sink.append_line(&format!("Prompt {:?} [{} -> {}]: {}", t.rule, t.from, t.to, shown));
        queue.enqueue(t.command);
    }

    /// Write every queued command to the channel in order
    pub fn transmit_pending(&mut self) {
        while let Some(command) = self.queue.dequeue() {
            let result = self
                .channel
                .write_all(command.as_bytes())
                .and_then(|_| self.channel.flush());
            match result {
                Ok(()) => {
                    self.stats.commands_sent += 1;
                    trace!(len = command.len(), "command sent");
                }
                Err(e) => {
                    self.stats.write_errors += 1;
                    self.sink.append_line(&format!("Write error: {}", e));
                }
            }
        }
    }

    /// Run one read/recognize/transmit/rotate cycle
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let outcome = match self.channel.read(&mut self.read_buf) {
            Ok(0) => CycleOutcome::Closed,
            Ok(n) => {
                debug!("Got {} bytes", n);
                let chunk = self.read_buf[..n].to_vec();
                self.process_chunk(&chunk);
                self.transmit_pending();
                CycleOutcome::Data(n)
            }
            Err(e) if is_idle(&e) => CycleOutcome::Idle,
            Err(e) => {
                self.stats.read_errors += 1;
                self.sink.append_line(&format!("Read error: {}", e));
                CycleOutcome::ReadError
            }
        };

        if self.sink.check_rotation() {
            self.stats.rotations += 1;
        }

        outcome
    }

    /// Cycle until `shutdown` is raised, then return the counters
    pub fn run(&mut self, shutdown: &AtomicBool) -> SessionStats {
        self.sink
            .append_line(&format!("Start loop on {}", self.channel.name()));
        while !shutdown.load(Ordering::SeqCst) {
            if self.run_cycle() == CycleOutcome::Closed {
                // A hung-up tty reads 0 forever; avoid spinning on it
                std::thread::sleep(POLL_INTERVAL);
            }
        }
        self.sink.append_line(&format!("Stopping: {}", self.stats));
        self.stats
    }

    /// Recognizer state
    pub fn recognizer(&self) -> &PromptRecognizer {
        &self.recognizer
    }

    /// Commands waiting to be sent
    pub fn queue(&self) -> &OutboundQueue {
        &self.queue
    }

    /// Counters so far
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Underlying channel
    pub fn channel(&self) -> &Ch {
        &self.channel
    }

    /// Journal the session writes to
    pub fn sink(&self) -> &L {
        &self.sink
    }

    /// Tear down the session, returning the channel and sink
    pub fn into_parts(self) -> (Ch, L) {
        (self.channel, self.sink)
    }
}

fn is_idle(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// First journal line of a run
pub fn banner(config: &WatcherConfig) -> String {
    format!(
        "Watcher v.{} started [{}, {}, {}]",
        crate::VERSION,
        config.serial.device,
        config.serial.baud,
        config.log.base_path.display()
    )
}
