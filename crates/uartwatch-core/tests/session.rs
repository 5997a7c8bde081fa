mod common;

use common::{MemorySink, MockSerial};
use pretty_assertions::assert_eq;
use std::io;

use uartwatch_core::config::{Profile, WatcherConfig};
use uartwatch_core::login::LoginState;
use uartwatch_core::session::{CycleOutcome, Session};

fn config() -> WatcherConfig {
    WatcherConfig {
        profiles: vec![Profile {
            host: "emak".into(),
            user: "pi".into(),
            password: "raspberry".into(),
            ip_query: "ip -4 addr".into(),
            command: "uptime".into(),
        }],
        ..WatcherConfig::default()
    }
}

fn session(chunks: &[&[u8]]) -> Session<MockSerial, MemorySink> {
    Session::new(&config(), MockSerial::with_chunks(chunks), MemorySink::default())
}

#[test]
fn test_login_banner_sends_username() {
    let mut s = session(&[b"emak login:\n"]);
    s.process_chunk(b"emak login:\n");

    assert_eq!(s.recognizer().state(), LoginState::SawLogin);
    assert_eq!(s.queue().front(), Some("pi\n"));
}

#[test]
fn test_password_after_login() {
    let mut s = session(&[b"emak login:\n", b"Password:\n"]);
    assert_eq!(s.run_cycle(), CycleOutcome::Data(12));
    assert_eq!(s.run_cycle(), CycleOutcome::Data(10));

    assert_eq!(s.recognizer().state(), LoginState::SawPassword);
    assert_eq!(s.channel().writes, vec!["pi\n", "raspberry\n"]);
    assert!(s.queue().is_empty());
}

#[test]
fn test_full_script_with_echo() {
    let mut s = session(&[
        b"\r\nDebian GNU/Linux 12 emak ttyAMA3\r\n\r\nemak login: ",
        b"pi\r\nPassword: ",
        b"\r\nLinux emak 6.1.21\r\npi@emak:~$ ",
        b"ip -4 addr\r\n    inet 10.0.0.7/24\r\npi@emak:~$ ",
        b"uptime\r\n 12:00:00 up 3 days\r\npi@emak:~$ ",
    ]);
    for _ in 0..5 {
        s.run_cycle();
    }

    assert_eq!(s.recognizer().state(), LoginState::SawCommand);
    assert_eq!(
        s.channel().writes,
        vec!["pi\n", "raspberry\n", "ip -4 addr\n", "uptime\n"]
    );
    assert_eq!(s.stats().commands_sent, 4);
}

#[test]
fn test_multiple_prompts_in_one_chunk_keep_order() {
    let mut s = session(&[b"emak login:\nPassword:\npi@emak:~$\n"]);
    s.run_cycle();

    assert_eq!(
        s.channel().writes,
        vec!["pi\n", "raspberry\n", "ip -4 addr\n"]
    );
    assert_eq!(s.recognizer().state(), LoginState::SawIpQuery);
}

#[test]
fn test_login_takes_precedence_over_sudo() {
    let mut s = session(&[]);
    s.process_chunk(b"[sudo] password for pi: emak login:\n");

    assert_eq!(s.recognizer().state(), LoginState::SawLogin);
    assert_eq!(s.queue().len(), 1);
    assert_eq!(s.queue().front(), Some("pi\n"));
}

#[test]
fn test_sudo_prompt_answers_password() {
    let mut s = session(&[b"[sudo] password for pi: "]);
    s.run_cycle();

    assert_eq!(s.channel().writes, vec!["raspberry\n"]);
    assert_eq!(s.recognizer().state(), LoginState::None);
}

#[test]
fn test_partial_prompt_fires_once() {
    let mut s = session(&[b"emak log", b"in: ", b"pi\r\n"]);
    s.run_cycle();
    assert!(s.channel().writes.is_empty());
    s.run_cycle();
    s.run_cycle();

    assert_eq!(s.channel().writes, vec!["pi\n"]);
}

#[test]
fn test_partial_matching_disabled() {
    let config = WatcherConfig {
        match_partial_lines: false,
        ..config()
    };
    let mut s = Session::new(
        &config,
        MockSerial::with_chunks(&[b"emak login: ", b"\n"]),
        MemorySink::default(),
    );
    s.run_cycle();
    assert!(s.channel().writes.is_empty());
    s.run_cycle();
    assert_eq!(s.channel().writes, vec!["pi\n"]);
}

#[test]
fn test_records_are_journaled_and_secrets_masked() {
    let mut s = session(&[b"emak login:\nPassword:\n"]);
    s.run_cycle();

    let lines = &s.sink().lines;
    assert!(lines.contains(&"emak login:".to_string()));
    assert!(lines.contains(&"Password:".to_string()));
    assert!(lines.iter().any(|l| l.ends_with(": pi")));
    assert!(!lines.iter().any(|l| l.contains("raspberry")));
}

#[test]
fn test_write_failure_is_reported_and_loop_continues() {
    let mut mock = MockSerial::with_chunks(&[b"emak login:\n", b"Password:\n"]);
    mock.fail_on_send = true;
    let mut s = Session::new(&config(), mock, MemorySink::default());

    s.run_cycle();
    s.run_cycle();

    assert_eq!(s.stats().write_errors, 2);
    assert_eq!(s.stats().commands_sent, 0);
    assert!(s.queue().is_empty());
    assert_eq!(s.recognizer().state(), LoginState::SawPassword);
    assert!(s.sink().lines.iter().any(|l| l.starts_with("Write error")));
}

#[test]
fn test_read_failure_is_reported_and_loop_continues() {
    let mut mock = MockSerial::new();
    mock.push_error(io::ErrorKind::Other);
    let mut s = Session::new(&config(), mock, MemorySink::default());

    assert_eq!(s.run_cycle(), CycleOutcome::ReadError);
    assert_eq!(s.run_cycle(), CycleOutcome::Idle);
    assert_eq!(s.stats().read_errors, 1);
    assert!(s.sink().lines.iter().any(|l| l.starts_with("Read error")));
}

#[test]
fn test_large_text_capacity_does_not_preallocate() {
    let config = WatcherConfig {
        text_capacity: usize::MAX,
        ..config()
    };
    let mut s = Session::new(&config, MockSerial::new(), MemorySink::default());
    s.process_chunk(b"emak login:\n");
    assert_eq!(s.recognizer().state(), LoginState::SawLogin);
    assert_eq!(s.sink().lines.first().map(String::as_str), Some("emak login:"));
}

#[test]
fn test_hexdump_mode() {
    let config = WatcherConfig {
        hexdump: true,
        ..config()
    };
    let chunk: Vec<u8> = (b'A'..b'A' + 20).collect();
    let mut s = Session::new(&config, MockSerial::with_chunks(&[chunk.as_slice()]), MemorySink::default());
    assert!(s.is_hexdump());
    s.run_cycle();

    let lines = &s.sink().lines;
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "41 42 43 44 45 46 47 48 49 4A 4B 4C 4D 4E 4F 50  ABCDEFGHIJKLMNOP"
    );
    assert_eq!(lines[1], format!("{:<47}  QRST", "51 52 53 54"));
    assert_eq!(lines[0].len(), lines[1].len() + 12);
}

#[test]
fn test_hexdump_never_recognizes() {
    let config = WatcherConfig {
        hexdump: true,
        ..config()
    };
    let mut s = Session::new(
        &config,
        MockSerial::with_chunks(&[b"emak login:\n"]),
        MemorySink::default(),
    );
    s.run_cycle();

    assert_eq!(s.recognizer().state(), LoginState::None);
    assert!(s.channel().writes.is_empty());
}

#[test]
fn test_run_stops_on_shutdown_flag() {
    use std::sync::atomic::AtomicBool;

    let mut s = session(&[b"emak login:\n"]);
    let shutdown = AtomicBool::new(true);
    let stats = s.run(&shutdown);

    assert_eq!(stats.bytes_read, 0);
    assert_eq!(
        s.sink().lines.first().map(String::as_str),
        Some("Start loop on mock")
    );
    assert!(s.sink().lines.last().unwrap().starts_with("Stopping:"));
}
