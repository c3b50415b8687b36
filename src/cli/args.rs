use crate::domain::config::{
    DataBits, DisplayMode, FlowControl, LineEndingMode, Parity, SessionConfig, SessionDefaults, StopBits,
};
use crate::domain::error::{SerialFlowError, SerialFlowResult};
use crate::domain::port::PortDescriptor;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments for SerialFlow
#[derive(Parser, Debug)]
#[command(
    name = "serialflow",
    version = env!("CARGO_PKG_VERSION"),
    about = "Serial terminal for embedded device debugging",
    long_about = "A serial terminal that sends line-oriented text or raw bytes to a device and shows what comes back as text or hex, with optional session logging."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress diagnostic logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for listings
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available serial ports
    #[command(alias = "ports")]
    List,
    /// Open a port and exchange data interactively
    Monitor(MonitorArgs),
    /// Open a port, send one message and close it
    Send(SendArgs),
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
    /// CSV output
    Csv,
}

/// Port and framing options shared by commands that open a device.
/// Unset options fall back to the `[session]` configuration.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Data bits (5-8)
    #[arg(long, value_parser = clap::value_parser!(u8).range(5..=8))]
    pub data_bits: Option<u8>,

    /// Stop bits
    #[arg(long, value_enum)]
    pub stop_bits: Option<StopBitsArg>,

    /// Parity
    #[arg(long, value_enum)]
    pub parity: Option<ParityArg>,

    /// Flow control
    #[arg(long, value_enum)]
    pub flow_control: Option<FlowControlArg>,
}

/// Interactive monitor arguments
#[derive(ClapArgs, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Line ending appended to every line typed on stdin
    #[arg(short, long, value_enum)]
    pub line_ending: Option<LineEndingArg>,

    /// How received bytes are shown
    #[arg(short, long, value_enum)]
    pub display: Option<DisplayArg>,

    /// Prefix lines with the local time
    #[arg(long)]
    pub timestamps: bool,

    /// Do not prefix lines with the local time
    #[arg(long)]
    pub no_timestamps: bool,

    /// Append the transcript to this file (or a timestamped file in this directory)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Interval between reads of the port, in milliseconds
    #[arg(long)]
    pub poll_ms: Option<u64>,
}

/// One-shot send arguments
#[derive(ClapArgs, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Data to send
    pub data: String,

    /// Data format (text, hex, base64)
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: DataFormat,

    /// Line ending appended to text data
    #[arg(short, long, value_enum)]
    pub line_ending: Option<LineEndingArg>,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration
    Validate {
        /// Configuration file path
        file: Option<PathBuf>,
    },
    /// Create default configuration
    Init {
        /// Output file path
        #[arg(long)]
        path: Option<PathBuf>,
        /// Write the user-wide configuration instead of the project one
        #[arg(short, long)]
        global: bool,
    },
    /// Show configuration file locations
    Path,
}

/// Stop bits argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StopBitsArg {
    #[value(name = "1")]
    One,
    #[value(name = "1.5")]
    OneAndHalf,
    #[value(name = "2")]
    Two,
}

/// Parity configuration argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ParityArg {
    None,
    Even,
    Odd,
    Space,
    Mark,
}

/// Flow control configuration argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FlowControlArg {
    None,
    Software,
    Hardware,
}

/// Line ending argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LineEndingArg {
    Lf,
    Cr,
    Crlf,
    None,
}

/// Display mode argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DisplayArg {
    Text,
    Hex,
}

/// Data format argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Text,
    Hex,
    Base64,
}

impl ConnectionArgs {
    /// Port and configuration from the arguments, completed from `defaults`.
    pub fn resolve(&self, defaults: &SessionDefaults) -> SerialFlowResult<(PortDescriptor, SessionConfig)> {
        let port = self
            .port
            .clone()
            .or_else(|| defaults.port.clone())
            .ok_or_else(|| {
                SerialFlowError::InvalidInput(
                    "No serial port given; use --port or set session.port in the configuration".to_string(),
                )
            })?;

        let mut config = defaults.session_config();
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(bits) = self.data_bits {
            config.data_bits = DataBits::try_from(bits).map_err(SerialFlowError::InvalidInput)?;
        }
        if let Some(stop_bits) = self.stop_bits {
            config.stop_bits = stop_bits.into();
        }
        if let Some(parity) = self.parity {
            config.parity = parity.into();
        }
        if let Some(flow_control) = self.flow_control {
            config.flow_control = flow_control.into();
        }

        Ok((PortDescriptor::new(port), config))
    }
}

impl MonitorArgs {
    pub fn show_timestamp(&self, defaults: &SessionDefaults) -> bool {
        if self.no_timestamps {
            false
        } else if self.timestamps {
            true
        } else {
            defaults.show_timestamp
        }
    }
}

impl From<StopBitsArg> for StopBits {
    fn from(stop_bits: StopBitsArg) -> Self {
        match stop_bits {
            StopBitsArg::One => Self::One,
            StopBitsArg::OneAndHalf => Self::OneAndHalf,
            StopBitsArg::Two => Self::Two,
        }
    }
}

impl From<ParityArg> for Parity {
    fn from(parity: ParityArg) -> Self {
        match parity {
            ParityArg::None => Self::None,
            ParityArg::Even => Self::Even,
            ParityArg::Odd => Self::Odd,
            ParityArg::Space => Self::Space,
            ParityArg::Mark => Self::Mark,
        }
    }
}

impl From<FlowControlArg> for FlowControl {
    fn from(flow_control: FlowControlArg) -> Self {
        match flow_control {
            FlowControlArg::None => Self::None,
            FlowControlArg::Software => Self::Software,
            FlowControlArg::Hardware => Self::Hardware,
        }
    }
}

impl From<LineEndingArg> for LineEndingMode {
    fn from(line_ending: LineEndingArg) -> Self {
        match line_ending {
            LineEndingArg::Lf => Self::Lf,
            LineEndingArg::Cr => Self::Cr,
            LineEndingArg::Crlf => Self::Crlf,
            LineEndingArg::None => Self::None,
        }
    }
}

impl From<DisplayArg> for DisplayMode {
    fn from(display: DisplayArg) -> Self {
        match display {
            DisplayArg::Text => Self::Text,
            DisplayArg::Hex => Self::Hex,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Text => write!(f, "text"),
            DataFormat::Hex => write!(f, "hex"),
            DataFormat::Base64 => write!(f, "base64"),
        }
    }
}
