use crate::core::codec;
use crate::core::session::event::{ReceivedChunk, SessionEvent, SessionObserver, Subscribers, SubscriptionId};
use crate::core::session::fault::{self, FaultClass};
use crate::core::session::state::ConnectionState;
use crate::core::transport::{Device, DeviceOpener};
use crate::domain::{
    config::{LineEndingMode, SessionConfig},
    error::SessionError,
    port::PortDescriptor,
};
use std::io;
use tracing::{debug, error, info, trace, warn};

/// Upper bound on bytes drained by one read notification. Anything still
/// pending is picked up by the next notification.
const MAX_CHUNK_BYTES: usize = 64 * 1024;

struct Link {
    device: Box<dyn Device>,
    config: SessionConfig,
}

/// Owns at most one open serial device and reports what happens on it.
///
/// The session never spawns threads or tasks. The host event loop calls
/// [`on_ready_read`](Self::on_ready_read) when the device may have data and
/// [`on_device_fault`](Self::on_device_fault) when it observed an error.
/// Events are delivered synchronously, in registration order, before the
/// triggering call returns.
pub struct ConnectionSession {
    opener: Box<dyn DeviceOpener>,
    link: Option<Link>,
    state: ConnectionState,
    port_name: String,
    subscribers: Subscribers,
    next_arrival: u64,
}

impl ConnectionSession {
    pub fn with_opener(opener: impl DeviceOpener + 'static) -> Self {
        Self {
            opener: Box::new(opener),
            link: None,
            state: ConnectionState::Disconnected,
            port_name: String::new(),
            subscribers: Subscribers::default(),
            next_arrival: 0,
        }
    }

    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) -> SubscriptionId {
        self.subscribers.subscribe(Box::new(observer))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Opens `port`, closing the current device first if one is open.
    ///
    /// Emits `ConnectionChanged(true)` on success and
    /// `ConnectionChanged(false)` on failure. The previous device is always
    /// released before the new one is acquired.
    pub fn open(&mut self, port: &PortDescriptor, config: SessionConfig) -> Result<(), SessionError> {
        if self.link.is_some() {
            debug!("Closing '{}' before opening '{}'", self.port_name, port.name);
            self.close();
        }

        self.port_name = port.name.clone();

        match self.acquire(port, &config) {
            Ok(device) => {
                self.link = Some(Link { device, config });
                self.state = ConnectionState::Open;
                info!("Opened serial port '{}' ({})", port.name, config);
                self.emit(SessionEvent::ConnectionChanged(true));
                Ok(())
            }
            Err(err) => {
                self.state = ConnectionState::Disconnected;
                error!("Failed to open serial port '{}': {}", port.name, err.diagnostic());
                self.emit(SessionEvent::ConnectionChanged(false));
                Err(err)
            }
        }
    }

    fn acquire(&self, port: &PortDescriptor, config: &SessionConfig) -> Result<Box<dyn Device>, SessionError> {
        if !port.is_well_formed() {
            return Err(SessionError::OpenFailed(format!("Invalid port name '{}'", port.name)));
        }
        config.validate()?;
        self.opener.open(port, config)
    }

    /// Releases the device. Does nothing when no device is open.
    pub fn close(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };

        self.state = ConnectionState::Closing;
        drop(link);
        self.state = ConnectionState::Disconnected;

        info!("Closed serial port '{}'", self.port_name);
        self.emit(SessionEvent::ConnectionChanged(false));
    }

    /// Frames `text` with `line_ending` and writes it.
    pub fn send(&mut self, text: &str, line_ending: LineEndingMode) -> Result<(), SessionError> {
        if self.link.is_none() {
            return Err(SessionError::NotConnected);
        }
        self.write_frame(codec::frame_for_send(text, line_ending))
    }

    /// Writes `bytes` without framing.
    pub fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        if self.link.is_none() {
            return Err(SessionError::NotConnected);
        }
        self.write_frame(bytes.to_vec())
    }

    fn write_frame(&mut self, data: Vec<u8>) -> Result<(), SessionError> {
        let outcome = match self.link.as_mut() {
            Some(link) => write_once(link.device.as_mut(), &data),
            None => return Err(SessionError::NotConnected),
        };

        match outcome {
            Ok(written) if written == data.len() => {
                debug!("Sent {} bytes to '{}'", written, self.port_name);
                self.emit(SessionEvent::DataSent(data));
                Ok(())
            }
            Ok(written) => {
                warn!("Short write to '{}': {} of {} bytes", self.port_name, written, data.len());
                Err(SessionError::WriteFailed(format!(
                    "Short write: {} of {} bytes written",
                    written,
                    data.len()
                )))
            }
            Err(err) => {
                let failure = SessionError::WriteFailed(err.to_string());
                if fault::classify(&err) == FaultClass::ResourceLost {
                    self.on_device_fault(&err);
                }
                Err(failure)
            }
        }
    }

    /// Drains pending input and emits it as one `DataReceived` event.
    ///
    /// Nothing is emitted when no bytes were pending. A read error is handed
    /// to [`on_device_fault`](Self::on_device_fault) after any bytes read
    /// before it have been delivered.
    pub fn on_ready_read(&mut self) {
        let (bytes, fault) = match self.link.as_mut() {
            Some(link) => drain(link.device.as_mut()),
            None => return,
        };

        if !bytes.is_empty() {
            let arrival_order = self.next_arrival;
            self.next_arrival += 1;
            debug!("Received {} bytes from '{}'", bytes.len(), self.port_name);
            self.emit(SessionEvent::DataReceived(ReceivedChunk { bytes, arrival_order }));
        }

        if let Some(err) = fault {
            self.on_device_fault(&err);
        }
    }

    /// Applies the fault policy to an error reported by the open device.
    ///
    /// Transient faults are dropped. Others are emitted as `ErrorOccurred`;
    /// resource loss then closes the session. Ignored when not open.
    pub fn on_device_fault(&mut self, err: &io::Error) {
        if !self.state.is_open() {
            trace!("Ignoring fault while {}: {}", self.state, err);
            return;
        }

        match fault::classify(err) {
            FaultClass::Transient => {
                trace!("Transient fault on '{}': {}", self.port_name, err);
            }
            FaultClass::Device => {
                warn!("Device error on '{}': {}", self.port_name, err);
                self.emit(SessionEvent::ErrorOccurred(SessionError::DeviceError(err.to_string())));
            }
            FaultClass::ResourceLost => {
                error!("Serial port '{}' lost: {}", self.port_name, err);
                self.emit(SessionEvent::ErrorOccurred(SessionError::ResourceLost(err.to_string())));
                self.close();
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Name of the most recently opened (or attempted) port.
    pub fn current_port_name(&self) -> &str {
        &self.port_name
    }

    /// Configuration of the open connection.
    pub fn config(&self) -> Option<&SessionConfig> {
        self.link.as_ref().map(|link| &link.config)
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.dispatch(&event);
    }
}

impl Drop for ConnectionSession {
    fn drop(&mut self) {
        if self.link.is_some() {
            debug!("Releasing serial port '{}' on session drop", self.port_name);
        }
    }
}

fn write_once(device: &mut dyn Device, data: &[u8]) -> io::Result<usize> {
    let written = device.write(data)?;
    if written == data.len() {
        device.flush()?;
    }
    Ok(written)
}

fn drain(device: &mut dyn Device) -> (Vec<u8>, Option<io::Error>) {
    let mut chunk = Vec::new();

    while chunk.len() < MAX_CHUNK_BYTES {
        let pending = match device.bytes_to_read() {
            Ok(0) => break,
            Ok(n) => n.min(MAX_CHUNK_BYTES - chunk.len()),
            Err(err) => return (chunk, Some(err)),
        };

        let start = chunk.len();
        chunk.resize(start + pending, 0);
        match device.read(&mut chunk[start..]) {
            Ok(0) => {
                chunk.truncate(start);
                break;
            }
            Ok(n) => chunk.truncate(start + n),
            Err(err) => {
                chunk.truncate(start);
                return (chunk, Some(err));
            }
        }
    }

    (chunk, None)
}
