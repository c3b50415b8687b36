// Domain module - Configuration values, port identity and error types
pub mod config;
pub mod error;
pub mod port;
