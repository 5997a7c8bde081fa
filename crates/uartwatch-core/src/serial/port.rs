//! Serial port handling
//!
//! Opens and configures the UART the watcher listens on.

use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::collections::HashMap;
#[cfg(unix)]
use std::fs;

use super::{BaudRate, SerialChannel, MAX_DEVICE_PATH, POLL_INTERVAL};
use crate::config::SerialSettings;
use crate::error::WatchError;

/// Information about an available serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyAMA3" or "COM3")
    pub name: String,

    /// Product name (if available)
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let product = match info.port_type {
            SerialPortType::UsbPort(usb_info) => usb_info.product,
            _ => None,
        };

        Self {
            name: info.port_name,
            product,
        }
    }
}

/// Sort key placing ttyACM* first, then ttyUSB*, then everything else
fn port_sort_key(name: &str) -> (u8, usize, String) {
    let basename = name.rsplit('/').next().unwrap_or(name);
    if let Some(rest) = basename.strip_prefix("ttyACM") {
        let num = rest.parse::<usize>().unwrap_or(usize::MAX);
        return (0, num, basename.to_string());
    }
    if let Some(rest) = basename.strip_prefix("ttyUSB") {
        let num = rest.parse::<usize>().unwrap_or(usize::MAX);
        return (1, num, basename.to_string());
    }
    (2, 0, basename.to_string())
}

/// List all available serial ports, with /dev fallbacks and deterministic ordering
pub fn list_ports() -> Vec<PortInfo> {
    let mut map: HashMap<String, PortInfo> = HashMap::new();
    for info in serialport::available_ports().unwrap_or_default() {
        let p = PortInfo::from(info);
        map.entry(p.name.clone()).or_insert(p);
    }

    // On-board UARTs are often missing from the enumeration API
    #[cfg(target_os = "linux")]
    if let Ok(entries) = fs::read_dir("/dev") {
        for entry in entries.flatten() {
            if let Some(fname) = entry.file_name().to_str() {
                if fname.starts_with("ttyACM")
                    || fname.starts_with("ttyUSB")
                    || fname.starts_with("ttyAMA")
                {
                    let full = format!("/dev/{}", fname);
                    map.entry(full.clone()).or_insert_with(|| PortInfo {
                        name: full,
                        product: None,
                    });
                }
            }
        }
    }

    let mut v: Vec<PortInfo> = map.into_values().collect();
    v.sort_by_key(|p| port_sort_key(&p.name));
    v
}

/// Check a device path against the length bound
pub fn check_device_path(path: &str) -> Result<(), WatchError> {
    if path.is_empty() {
        return Err(WatchError::Config("device path is empty".into()));
    }
    if path.len() > MAX_DEVICE_PATH {
        return Err(WatchError::DevicePathTooLong {
            len: path.len(),
            max: MAX_DEVICE_PATH,
        });
    }
    Ok(())
}

/// Open, configure and flush the serial device described by `settings`
pub fn open_port(settings: &SerialSettings) -> Result<SerialChannel, WatchError> {
    check_device_path(&settings.device)?;
    let baud = settings.baud_rate()?;
    let mut port = open_raw(&settings.device, baud)?;
    configure_port(port.as_mut())?;
    if settings.canonical {
        set_canonical(&settings.device)?;
    }
    clear_buffers(port.as_mut())?;
    Ok(SerialChannel::new(port))
}

fn open_raw(device: &str, baud: BaudRate) -> Result<Box<dyn SerialPort>, WatchError> {
    serialport::new(device, baud.bps())
        .timeout(POLL_INTERVAL)
        .open()
        .map_err(|e| WatchError::SerialError(e.to_string()))
}

/// Switch the terminal to canonical (line-buffered) input.
///
/// termios settings belong to the tty, so a second descriptor on the same
/// device is enough to change them for the open port.
#[cfg(unix)]
fn set_canonical(device: &str) -> Result<(), WatchError> {
    use nix::fcntl::OFlag;
    use nix::sys::termios::{tcgetattr, tcsetattr, LocalFlags, SetArg};
    use std::os::unix::fs::OpenOptionsExt;

    let tty = fs::OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags((OFlag::O_NOCTTY | OFlag::O_NONBLOCK).bits())
        .open(device)
        .map_err(|e| WatchError::SerialError(format!("failed to reopen {}: {}", device, e)))?;

    let mut termios = tcgetattr(&tty)
        .map_err(|e| WatchError::SerialError(format!("failed to get attributes: {}", e)))?;
    termios.local_flags.insert(LocalFlags::ICANON);
    tcsetattr(&tty, SetArg::TCSANOW, &termios)
        .map_err(|e| WatchError::SerialError(format!("failed to set attributes: {}", e)))
}

#[cfg(not(unix))]
fn set_canonical(_device: &str) -> Result<(), WatchError> {
    tracing::warn!("canonical line discipline is only available on unix; using raw mode");
    Ok(())
}

/// Configure a serial port for 8N1 without flow control
pub fn configure_port(port: &mut dyn SerialPort) -> Result<(), WatchError> {
    port.set_data_bits(serialport::DataBits::Eight)
        .map_err(|e| WatchError::SerialError(e.to_string()))?;
    port.set_parity(serialport::Parity::None)
        .map_err(|e| WatchError::SerialError(e.to_string()))?;
    port.set_stop_bits(serialport::StopBits::One)
        .map_err(|e| WatchError::SerialError(e.to_string()))?;
    port.set_flow_control(serialport::FlowControl::None)
        .map_err(|e| WatchError::SerialError(e.to_string()))?;
    Ok(())
}

/// Drop anything the device received before we started listening
pub fn clear_buffers(port: &mut dyn SerialPort) -> Result<(), WatchError> {
    port.clear(serialport::ClearBuffer::Input)
        .map_err(|e| WatchError::SerialError(e.to_string()))
}
