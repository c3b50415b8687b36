use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Kind of device behind a port, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Usb,
    Pci,
    Bluetooth,
    Unknown,
}

/// Identifies a serial device by its path or name (`/dev/ttyUSB0`, `COM3`).
///
/// Two descriptors are equal when their names are equal; the descriptive
/// fields only decorate listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDescriptor {
    pub name: String,
    pub kind: PortKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vid: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

impl PortDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PortKind::Unknown,
            vid: None,
            pid: None,
            manufacturer: None,
            product: None,
            serial_number: None,
        }
    }

    /// Checks that the name can identify a device at all. Whether the
    /// device exists is only known once the host tries to open it.
    pub fn is_well_formed(&self) -> bool {
        let name = self.name.trim();
        !name.is_empty() && !name.contains('\0')
    }

    /// One-line description for listings, e.g. `USB 2341:0043 Arduino Uno`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        match (self.vid, self.pid) {
            (Some(vid), Some(pid)) => parts.push(format!("USB {:04x}:{:04x}", vid, pid)),
            _ => parts.push(self.kind.to_string()),
        }
        if let Some(manufacturer) = &self.manufacturer {
            parts.push(manufacturer.clone());
        }
        if let Some(product) = &self.product {
            parts.push(product.clone());
        }
        parts.join(" ")
    }
}

impl PartialEq for PortDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PortDescriptor {}

impl Hash for PortDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl From<&str> for PortDescriptor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PortDescriptor {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for PortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::Usb => write!(f, "usb"),
            PortKind::Pci => write!(f, "pci"),
            PortKind::Bluetooth => write!(f, "bluetooth"),
            PortKind::Unknown => write!(f, "unknown"),
        }
    }
}
