// Serial module - Host serial port enumeration and access
pub mod catalog;
pub mod device;

pub use catalog::PortCatalog;
pub use device::{SerialDevice, SerialPortOpener};
