// CLI module - Command line interface
pub mod args;
pub mod commands;
pub mod monitor;
pub mod output;

pub use args::{Args, Command, OutputFormat};
pub use commands::execute_command;
pub use monitor::{ConsoleObserver, TranscriptFormatter};
pub use output::OutputWriter;
