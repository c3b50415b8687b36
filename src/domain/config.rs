use crate::domain::error::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SerialFlow configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerialFlowConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Defaults used when a command does not override them
    #[serde(default)]
    pub session: SessionDefaults,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Connection and display defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDefaults {
    /// Port opened when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default)]
    pub data_bits: DataBits,
    #[serde(default)]
    pub stop_bits: StopBits,
    #[serde(default)]
    pub parity: Parity,
    #[serde(default)]
    pub flow_control: FlowControl,
    #[serde(default)]
    pub line_ending: LineEndingMode,
    #[serde(default)]
    pub display_mode: DisplayMode,
    /// Prefix transcript lines with the local time
    #[serde(default = "default_show_timestamp")]
    pub show_timestamp: bool,
    /// Interval of the monitor's readiness tick
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// How a device is opened. Immutable once handed to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StopBits {
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "1.5")]
    OneAndHalf,
    #[serde(rename = "2")]
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
    Space,
    Mark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    #[default]
    None,
    Software,
    Hardware,
}

/// Terminator appended to outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEndingMode {
    #[default]
    Lf,
    Cr,
    Crlf,
    None,
}

/// Rendering of received bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Text,
    Hex,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_show_timestamp() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    10
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            data_bits: DataBits::default(),
            stop_bits: StopBits::default(),
            parity: Parity::default(),
            flow_control: FlowControl::default(),
            line_ending: LineEndingMode::default(),
            display_mode: DisplayMode::default(),
            show_timestamp: default_show_timestamp(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl SessionDefaults {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            baud_rate: self.baud_rate,
            data_bits: self.data_bits,
            stop_bits: self.stop_bits,
            parity: self.parity,
            flow_control: self.flow_control,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

impl SessionConfig {
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }

    /// Rejects values no device can be opened with.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.baud_rate == 0 {
            return Err(SessionError::OpenFailed(
                "Invalid baud rate: 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{}{}",
            self.baud_rate,
            u8::from(self.data_bits),
            self.parity.short_code(),
            self.stop_bits
        )
    }
}

impl TryFrom<u8> for DataBits {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(DataBits::Five),
            6 => Ok(DataBits::Six),
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            other => Err(format!("Invalid data bits: {}", other)),
        }
    }
}

impl From<DataBits> for u8 {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopBits::One => write!(f, "1"),
            StopBits::OneAndHalf => write!(f, "1.5"),
            StopBits::Two => write!(f, "2"),
        }
    }
}

impl Parity {
    fn short_code(&self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
            Parity::Space => 'S',
            Parity::Mark => 'M',
        }
    }
}

impl LineEndingMode {
    /// Bytes appended after the message text.
    pub fn suffix(&self) -> &'static str {
        match self {
            LineEndingMode::Lf => "\n",
            LineEndingMode::Cr => "\r",
            LineEndingMode::Crlf => "\r\n",
            LineEndingMode::None => "",
        }
    }
}

impl fmt::Display for LineEndingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEndingMode::Lf => write!(f, "LF"),
            LineEndingMode::Cr => write!(f, "CR"),
            LineEndingMode::Crlf => write!(f, "CRLF"),
            LineEndingMode::None => write!(f, "None"),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Text => write!(f, "text"),
            DisplayMode::Hex => write!(f, "hex"),
        }
    }
}
