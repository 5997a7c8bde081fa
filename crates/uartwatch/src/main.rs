//! uartwatch: unattended serial-console watcher
//!
//! Usage:
//!   uartwatch [OPTIONS]
//!
//! Listens on a UART, logs everything to weekly log files, and answers the
//! login, password and shell prompts of the configured profiles.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use uartwatch_core::config::{LineEnding, LogSettings, Profile, WatcherConfig};
use uartwatch_core::error::WatchError;
use uartwatch_core::journal::{Journal, LogSink, RotationPeriod};
use uartwatch_core::serial::{list_ports, open_port, BaudRate};
use uartwatch_core::session::{banner, Session};

/// Serial-console watcher with automatic login and rotating logs
#[derive(Parser, Debug)]
#[command(name = "uartwatch", version, long_about = None)]
struct Args {
    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device
    #[arg(short, long)]
    device: Option<String>,

    /// Baud rate (50 through 4000000)
    #[arg(short, long)]
    baud: Option<String>,

    /// Log file base path; may contain strftime specifiers
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Log raw bytes as hex/ASCII instead of framing lines
    #[arg(short = 'x', long)]
    hexdump: bool,

    /// Log rotation period: week, day or month
    #[arg(long)]
    rotate: Option<RotationPeriod>,

    /// Terminator for sent commands: lf, cr or crlf
    #[arg(long)]
    line_ending: Option<LineEnding>,

    /// Use the canonical (line-buffered) terminal mode
    #[arg(long)]
    canonical: bool,

    /// Only match prompts on completed lines
    #[arg(long)]
    no_partial: bool,

    /// Host name of the first profile
    #[arg(long)]
    host: Option<String>,

    /// Login user of the first profile
    #[arg(long)]
    user: Option<String>,

    /// Password of the first profile
    #[arg(long)]
    password: Option<String>,

    /// IP query command of the first profile
    #[arg(long)]
    ip_query: Option<String>,

    /// Command of the first profile
    #[arg(long)]
    command: Option<String>,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Enable verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("uartwatch: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    if args.list_ports {
        for port in list_ports() {
            match port.product {
                Some(product) => println!("{}\t{}", port.name, product),
                None => println!("{}", port.name),
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            // No log file yet: the console is the only target
            Journal::new(&LogSettings::default()).append_line(&e.to_string());
            return Ok(fatal(&e));
        }
    };

    let mut journal = Journal::new(&config.log);
    if let Err(e) = journal.start() {
        journal.append_line(&e.to_string());
        return Ok(fatal(&e));
    }

    journal.append_line(&banner(&config));
    journal.append_line("Init uart");
    let channel = match open_port(&config.serial) {
        Ok(channel) => channel,
        Err(e) => {
            journal.append_line(&format!("Init error: {}", e));
            return Ok(fatal(&e));
        }
    };
    if config.hexdump {
        journal.append_line("Diagnostic mode: dumping raw bytes");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("installing the termination handler")?;

    let mut session = Session::new(&config, channel, journal);
    session.run(&shutdown);

    let (channel, mut journal) = session.into_parts();
    drop(channel);
    journal.append_line("Stopped");
    journal.close();

    Ok(ExitCode::SUCCESS)
}

fn fatal(e: &WatchError) -> ExitCode {
    ExitCode::from(e.exit_code())
}

fn build_config(args: &Args) -> Result<WatcherConfig, WatchError> {
    let mut config = match &args.config {
        Some(path) => WatcherConfig::load(path)?,
        None => WatcherConfig::default(),
    };

    if let Some(device) = &args.device {
        config.serial.device = device.clone();
    }
    if let Some(baud) = &args.baud {
        config.serial.baud = baud.parse::<BaudRate>()?.bps();
    }
    if let Some(log) = &args.log {
        config.log.base_path = log.clone();
    }
    if let Some(rotate) = args.rotate {
        config.log.rotation = rotate;
    }
    if let Some(line_ending) = args.line_ending {
        config.line_ending = line_ending;
    }
    config.hexdump |= args.hexdump;
    config.serial.canonical |= args.canonical;
    if args.no_partial {
        config.match_partial_lines = false;
    }

    if config.profiles.is_empty() {
        config.profiles.push(Profile::default());
    }
    let first = &mut config.profiles[0];
    if let Some(host) = &args.host {
        first.host = host.clone();
    }
    if let Some(user) = &args.user {
        first.user = user.clone();
    }
    if let Some(password) = &args.password {
        first.password = password.clone();
    }
    if let Some(ip_query) = &args.ip_query {
        first.ip_query = ip_query.clone();
    }
    if let Some(command) = &args.command {
        first.command = command.clone();
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("uartwatch").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = build_config(&parse(&[])).unwrap();
        assert_eq!(config.serial.device, "/dev/ttyAMA3");
        assert_eq!(config.serial.baud, 115200);
        assert!(!config.hexdump);
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "-d", "/dev/ttyUSB0", "-b", "9600", "-l", "/tmp/w", "-x", "--host", "gw",
            "--user", "ops", "--rotate", "day", "--line-ending", "crlf",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.serial.device, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud, 9600);
        assert_eq!(config.log.base_path, PathBuf::from("/tmp/w"));
        assert!(config.hexdump);
        assert_eq!(config.profiles[0].login_prompt(), "gw login:");
        assert_eq!(config.log.rotation, RotationPeriod::Day);
        assert_eq!(config.line_ending, LineEnding::CrLf);
    }

    #[test]
    fn test_unsupported_rate_exit_code() {
        let err = build_config(&parse(&["-b", "12345"])).unwrap_err();
        assert!(matches!(err, WatchError::UnsupportedBaudRate(12345)));
        assert_eq!(err.exit_code(), 22);
    }

    #[test]
    fn test_non_numeric_rate_is_unsupported() {
        let err = build_config(&parse(&["-b", "abc"])).unwrap_err();
        assert!(matches!(err, WatchError::UnsupportedBaudRate(0)));
        assert_eq!(err.exit_code(), 22);
    }

    #[test]
    fn test_config_file_rate_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.json");
        std::fs::write(&path, r#"{ "serial": { "baud": 12345 } }"#).unwrap();

        let err = build_config(&parse(&["-c", path.to_str().unwrap()])).unwrap_err();
        assert!(matches!(err, WatchError::UnsupportedBaudRate(12345)));
        assert_eq!(err.exit_code(), 22);
    }
}
