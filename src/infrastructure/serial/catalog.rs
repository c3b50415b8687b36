use crate::domain::error::SerialFlowResult;
use crate::domain::port::{PortDescriptor, PortKind};
use serialport::{SerialPortInfo, SerialPortType};
use tracing::{debug, warn};

/// Enumerates the serial devices attached to the host.
pub struct PortCatalog;

impl PortCatalog {
    /// Currently attached ports, sorted by name. Empty when none are found
    /// or the host cannot be queried.
    pub fn list() -> Vec<PortDescriptor> {
        Self::try_list().unwrap_or_else(|e| {
            warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        })
    }

    /// Like [`PortCatalog::list`], but surfaces enumeration failures.
    pub fn try_list() -> SerialFlowResult<Vec<PortDescriptor>> {
        let ports = collect_ports(serialport::available_ports()?);
        debug!("Found {} serial ports", ports.len());
        Ok(ports)
    }

    pub fn names() -> Vec<String> {
        Self::list().into_iter().map(|port| port.name).collect()
    }

    /// The listed descriptor for `name`, with its USB metadata if known.
    pub fn find(name: &str) -> Option<PortDescriptor> {
        Self::list().into_iter().find(|port| port.name == name)
    }
}

fn collect_ports(ports: Vec<SerialPortInfo>) -> Vec<PortDescriptor> {
    let mut ports: Vec<PortDescriptor> = ports.into_iter().map(PortDescriptor::from).collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    ports.dedup();
    ports
}

impl From<SerialPortInfo> for PortDescriptor {
    fn from(info: SerialPortInfo) -> Self {
        let mut port = PortDescriptor::new(info.port_name);
        match info.port_type {
            SerialPortType::UsbPort(usb) => {
                port.kind = PortKind::Usb;
                port.vid = Some(usb.vid);
                port.pid = Some(usb.pid);
                port.manufacturer = usb.manufacturer;
                port.product = usb.product;
                port.serial_number = usb.serial_number;
            }
            SerialPortType::PciPort => port.kind = PortKind::Pci,
            SerialPortType::BluetoothPort => port.kind = PortKind::Bluetooth,
            SerialPortType::Unknown => port.kind = PortKind::Unknown,
        }
        port
    }
}
