use std::io;

/// How the session reacts to an asynchronous device fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Expected noise such as read timeouts; never reported.
    Transient,
    /// Reported to observers, connection stays open.
    Device,
    /// The device is gone; reported, then the session closes.
    ResourceLost,
}

#[cfg(unix)]
const LOST_OS_ERRORS: &[i32] = &[
    5,  // EIO
    6,  // ENXIO
    19, // ENODEV
];

#[cfg(windows)]
const LOST_OS_ERRORS: &[i32] = &[
    22,   // ERROR_BAD_COMMAND
    995,  // ERROR_OPERATION_ABORTED
    1167, // ERROR_DEVICE_NOT_CONNECTED
];

#[cfg(not(any(unix, windows)))]
const LOST_OS_ERRORS: &[i32] = &[];

/// Classifies an I/O error raised by a device. Unrecognised codes are
/// `Device`, never `ResourceLost`.
pub fn classify(err: &io::Error) -> FaultClass {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
            return FaultClass::Transient
        }
        io::ErrorKind::NotFound
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::UnexpectedEof => return FaultClass::ResourceLost,
        _ => {}
    }

    match err.raw_os_error() {
        Some(code) if LOST_OS_ERRORS.contains(&code) => FaultClass::ResourceLost,
        _ => FaultClass::Device,
    }
}
