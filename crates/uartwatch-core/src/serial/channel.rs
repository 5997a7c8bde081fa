use serialport::SerialPort;
use std::io::{self, Read, Write};

/// Abstraction for the duplex byte transport the watcher drives
pub trait CommunicationChannel: Read + Write {
    /// Human readable name of the underlying device
    fn name(&self) -> String;
}

/// Serial port wrapper implementing CommunicationChannel
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Wrap an opened and configured port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl CommunicationChannel for SerialChannel {
    fn name(&self) -> String {
        self.port.name().unwrap_or_else(|| "<unnamed>".to_string())
    }
}
