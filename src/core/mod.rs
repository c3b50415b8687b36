// Core module - Serial session state machine and framing
pub mod codec;
pub mod session;
pub mod transport;
