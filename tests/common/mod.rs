#![allow(dead_code)]

use serialflow::{Device, DeviceOpener, PortDescriptor, SessionConfig, SessionError, SessionEvent};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

/// Shared state of an in-memory loopback wire. Everything written comes
/// back on the read side, like a TX/RX jumper on a real adapter.
#[derive(Default)]
pub struct Wire {
    pub rx: VecDeque<u8>,
    pub written: Vec<u8>,
    pub write_calls: usize,
    pub opens: Vec<String>,
    pub live_handles: usize,
    pub max_live_handles: usize,
    pub read_fault: Option<io::ErrorKind>,
    pub write_fault: Option<io::ErrorKind>,
}

pub type SharedWire = Arc<Mutex<Wire>>;

pub struct LoopbackDevice {
    wire: SharedWire,
}

impl Read for LoopbackDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut wire = self.wire.lock().unwrap();
        let n = buf.len().min(wire.rx.len());
        for (slot, byte) in buf.iter_mut().zip(wire.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for LoopbackDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut wire = self.wire.lock().unwrap();
        wire.write_calls += 1;
        if let Some(kind) = wire.write_fault {
            return Err(io::Error::from(kind));
        }
        wire.written.extend_from_slice(buf);
        wire.rx.extend(buf.iter().copied());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Device for LoopbackDevice {
    fn bytes_to_read(&self) -> io::Result<usize> {
        let wire = self.wire.lock().unwrap();
        match wire.read_fault {
            Some(kind) if wire.rx.is_empty() => Err(io::Error::from(kind)),
            _ => Ok(wire.rx.len()),
        }
    }
}

impl Drop for LoopbackDevice {
    fn drop(&mut self) {
        if let Ok(mut wire) = self.wire.lock() {
            wire.live_handles -= 1;
        }
    }
}

/// Opens loopback devices for any name except those listed as missing.
pub struct LoopbackOpener {
    wire: SharedWire,
    missing: Vec<String>,
}

impl LoopbackOpener {
    pub fn new(wire: SharedWire) -> Self {
        Self { wire, missing: vec!["/dev/does-not-exist".to_string()] }
    }
}

impl DeviceOpener for LoopbackOpener {
    fn open(&self, port: &PortDescriptor, _config: &SessionConfig) -> Result<Box<dyn Device>, SessionError> {
        if self.missing.contains(&port.name) {
            return Err(SessionError::OpenFailed(format!("{}: No such file or directory", port.name)));
        }
        let mut wire = self.wire.lock().unwrap();
        wire.opens.push(port.name.clone());
        wire.live_handles += 1;
        wire.max_live_handles = wire.max_live_handles.max(wire.live_handles);
        Ok(Box::new(LoopbackDevice { wire: Arc::clone(&self.wire) }))
    }
}

/// Records every event delivered to it.
pub fn recorder() -> (Arc<Mutex<Vec<SessionEvent>>>, impl FnMut(&SessionEvent) + Send + 'static) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    (events, move |event: &SessionEvent| sink.lock().unwrap().push(event.clone()))
}

pub fn new_wire() -> SharedWire {
    Arc::new(Mutex::new(Wire::default()))
}
