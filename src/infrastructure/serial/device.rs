use crate::core::session::ConnectionSession;
use crate::core::transport::{Device, DeviceOpener};
use crate::domain::{
    config::{DataBits, FlowControl, Parity, SessionConfig, StopBits},
    error::SessionError,
    port::PortDescriptor,
};
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::debug;

/// Opens host serial ports through the `serialport` crate.
#[derive(Debug, Clone)]
pub struct SerialPortOpener {
    read_timeout: Duration,
}

impl SerialPortOpener {
    pub fn new(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }
}

impl Default for SerialPortOpener {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl DeviceOpener for SerialPortOpener {
    fn open(&self, port: &PortDescriptor, config: &SessionConfig) -> Result<Box<dyn Device>, SessionError> {
        let builder = serialport::new(port.name.as_str(), config.baud_rate)
            .data_bits(data_bits(config.data_bits))
            .stop_bits(stop_bits(config.stop_bits)?)
            .parity(parity(config.parity)?)
            .flow_control(flow_control(config.flow_control))
            .timeout(self.read_timeout);

        let serial = builder
            .open()
            .map_err(|e| SessionError::OpenFailed(e.to_string()))?;

        debug!("Acquired '{}' with {:?} read timeout", port.name, self.read_timeout);
        Ok(Box::new(SerialDevice { port: serial }))
    }
}

/// An open host serial port.
pub struct SerialDevice {
    port: Box<dyn SerialPort>,
}

impl Read for SerialDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Device for SerialDevice {
    fn bytes_to_read(&self) -> io::Result<usize> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(pending_query_error)
    }
}

/// The driver reports EIO/ENXIO/ENODEV from FIONREAD as `Unknown` without
/// an OS code; on a tty that means the line was hung up or unplugged.
fn pending_query_error(err: serialport::Error) -> io::Error {
    match err.kind() {
        serialport::ErrorKind::Unknown => io::Error::new(
            io::ErrorKind::BrokenPipe,
            format!("device hung up: {}", err.description),
        ),
        _ => io::Error::from(err),
    }
}

impl ConnectionSession {
    /// Session backed by the host's serial ports.
    pub fn new() -> Self {
        Self::with_opener(SerialPortOpener::default())
    }
}

impl Default for ConnectionSession {
    fn default() -> Self {
        Self::new()
    }
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn stop_bits(bits: StopBits) -> Result<serialport::StopBits, SessionError> {
    match bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        StopBits::OneAndHalf => Err(SessionError::OpenFailed(
            "1.5 stop bits are not supported by the host serial driver".to_string(),
        )),
    }
}

fn parity(parity: Parity) -> Result<serialport::Parity, SessionError> {
    match parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Space | Parity::Mark => Err(SessionError::OpenFailed(format!(
            "{:?} parity is not supported by the host serial driver",
            parity
        ))),
    }
}

fn flow_control(flow: FlowControl) -> serialport::FlowControl {
    match flow {
        FlowControl::None => serialport::FlowControl::None,
        FlowControl::Software => serialport::FlowControl::Software,
        FlowControl::Hardware => serialport::FlowControl::Hardware,
    }
}
