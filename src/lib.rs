//! SerialFlow Library
//!
//! Serial session management for embedded device debugging: port discovery,
//! a single-connection session with observer notifications, line-ending
//! framing, text/hex rendering and session transcripts.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::codec::{decode_for_display, frame_for_send};
pub use crate::core::session::{ConnectionSession, ConnectionState, ReceivedChunk, SessionEvent, SessionObserver, SubscriptionId};
pub use crate::core::transport::{Device, DeviceOpener};
pub use crate::domain::config::{DisplayMode, LineEndingMode, SerialFlowConfig, SessionConfig};
pub use crate::domain::error::{ErrorKind, SerialFlowError, SerialFlowResult, SessionError};
pub use crate::domain::port::PortDescriptor;
pub use crate::infrastructure::log_sink::{FileLogSink, LogSink};
pub use crate::infrastructure::serial::PortCatalog;
