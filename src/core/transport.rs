use crate::domain::{config::SessionConfig, error::SessionError, port::PortDescriptor};
use std::io::{self, Read, Write};

/// An open byte-stream device owned by a connection session.
///
/// Reads and writes must not block for longer than the driver's own short
/// timeout. Dropping the value releases the device.
pub trait Device: Read + Write + Send {
    /// Number of bytes waiting in the receive buffer.
    fn bytes_to_read(&self) -> io::Result<usize>;
}

/// Acquires devices for a session.
pub trait DeviceOpener: Send {
    fn open(
        &self,
        port: &PortDescriptor,
        config: &SessionConfig,
    ) -> Result<Box<dyn Device>, SessionError>;
}
