//! Watcher configuration
//!
//! Loaded from an optional JSON file and then overridden by command line flags.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WatchError;
use crate::journal::RotationPeriod;
use crate::serial::{port::check_device_path, BaudRate, DEFAULT_DEVICE};

/// Default capacity of the text accumulator
pub const DEFAULT_TEXT_CAPACITY: usize = 2048;

/// Largest accepted text accumulator capacity
pub const MAX_TEXT_CAPACITY: usize = 64 * 1024;

/// Serial device settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Device path (e.g., "/dev/ttyAMA3")
    pub device: String,

    /// Line rate in bits per second; must be one of the supported rates
    pub baud: u32,

    /// Use canonical (line-buffered) terminal input instead of raw
    pub canonical: bool,
}

impl SerialSettings {
    /// Resolve the configured rate against the baud-rate table
    pub fn baud_rate(&self) -> Result<BaudRate, WatchError> {
        BaudRate::from_num(self.baud)
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: BaudRate::default().bps(),
            canonical: false,
        }
    }
}

/// Persistent log settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Base path of the log files; may contain strftime specifiers
    pub base_path: PathBuf,

    /// Period that names (and rolls over) the log files
    pub rotation: RotationPeriod,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("uartwatch.log"),
            rotation: RotationPeriod::Week,
        }
    }
}

/// One remote identity the watcher can log in as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Host name shown in the login banner and shell prompt
    pub host: String,

    /// Login user
    pub user: String,

    /// Password for login and sudo
    #[serde(default)]
    pub password: String,

    /// Command sent at the first shell prompt
    #[serde(default = "default_ip_query")]
    pub ip_query: String,

    /// Command sent at the second shell prompt
    #[serde(default = "default_command")]
    pub command: String,
}

fn default_ip_query() -> String {
    "hostname -I".to_string()
}

fn default_command() -> String {
    "uptime".to_string()
}

impl Profile {
    /// Create a profile with the default ip query and command
    pub fn new(host: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            ip_query: default_ip_query(),
            command: default_command(),
        }
    }

    /// Login banner, e.g. `emak login:`
    pub fn login_prompt(&self) -> String {
        format!("{} login:", self.host)
    }

    /// Shell prompt, e.g. `emak@emak:~$`
    pub fn shell_prompt(&self) -> String {
        format!("{}@{}:~$", self.user, self.host)
    }

    /// sudo password request, e.g. `[sudo] password for emak:`
    pub fn sudo_prompt(&self) -> String {
        format!("[sudo] password for {}:", self.user)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("emak", "emak", "")
    }
}

/// Terminator appended to every outbound command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r`
    Cr,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Terminator bytes as text
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl std::str::FromStr for LineEnding {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lf" => Ok(LineEnding::Lf),
            "cr" => Ok(LineEnding::Cr),
            "crlf" => Ok(LineEnding::CrLf),
            other => Err(WatchError::Config(format!("unknown line ending '{}'", other))),
        }
    }
}

/// Complete watcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Serial device settings
    pub serial: SerialSettings,

    /// Log file settings
    pub log: LogSettings,

    /// Credential table, in banner-matching order
    pub profiles: Vec<Profile>,

    /// Terminator for outbound commands
    pub line_ending: LineEnding,

    /// Dump raw bytes as hex instead of framing lines (fixed for the process lifetime)
    pub hexdump: bool,

    /// Probe the unterminated tail of the buffer for prompts after each read
    pub match_partial_lines: bool,

    /// Capacity of the text accumulator in bytes
    pub text_capacity: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            serial: SerialSettings::default(),
            log: LogSettings::default(),
            profiles: vec![Profile::default()],
            line_ending: LineEnding::Lf,
            hexdump: false,
            match_partial_lines: true,
            text_capacity: DEFAULT_TEXT_CAPACITY,
        }
    }
}

impl WatcherConfig {
    /// Load a configuration file; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WatchError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            WatchError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WatchError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject configurations the watcher cannot run with
    pub fn validate(&self) -> Result<(), WatchError> {
        check_device_path(&self.serial.device)?;
        self.serial.baud_rate()?;

        if self.log.base_path.as_os_str().is_empty() {
            return Err(WatchError::Config("log base path is empty".into()));
        }
        if self.profiles.is_empty() {
            return Err(WatchError::Config("at least one profile is required".into()));
        }
        for (i, profile) in self.profiles.iter().enumerate() {
            if profile.host.trim().is_empty() || profile.user.trim().is_empty() {
                return Err(WatchError::Config(format!(
                    "profile {} needs a host and a user",
                    i
                )));
            }
        }
        // Room for at least one byte plus the overflow margin
        if self.text_capacity < 4 || self.text_capacity > MAX_TEXT_CAPACITY {
            return Err(WatchError::Config(format!(
                "text capacity {} is outside 4..={}",
                self.text_capacity, MAX_TEXT_CAPACITY
            )));
        }
        Ok(())
    }
}
