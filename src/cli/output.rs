use crate::cli::args::OutputFormat;
use crate::domain::config::SerialFlowConfig;
use crate::domain::port::PortDescriptor;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_ports(&self, ports: &[PortDescriptor]) -> Result<(), OutputError>;
    fn write_config(&self, config: &SerialFlowConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::SerialFlowError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_ports(&self, ports: &[PortDescriptor]) -> Result<(), OutputError> {
        println!("{}", render_ports(ports, self.format)?);
        Ok(())
    }

    fn write_config(&self, config: &SerialFlowConfig) -> Result<(), OutputError> {
        let output = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(config)?,
            _ => toml::to_string_pretty(config)?,
        };
        println!("{}", output.trim_end());
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::json!({ "message": message })),
            _ => println!("{}", message),
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": error })),
            _ => eprintln!("Error: {}", error),
        }
        Ok(())
    }
}

/// Renders a port listing in `format`.
pub fn render_ports(ports: &[PortDescriptor], format: OutputFormat) -> Result<String, OutputError> {
    let rendered = match format {
        OutputFormat::Text => {
            if ports.is_empty() {
                "No serial ports found".to_string()
            } else {
                let mut lines = vec!["Available serial ports:".to_string()];
                for port in ports {
                    lines.push(format!("  {} ({})", port.name, port.summary()));
                }
                lines.join("\n")
            }
        }
        OutputFormat::Json => serde_json::to_string_pretty(ports)?,
        OutputFormat::Table => {
            let rows: Vec<PortTableRow> = ports.iter().map(PortTableRow::from).collect();
            Table::new(rows).to_string()
        }
        OutputFormat::Csv => {
            let mut lines = vec!["name,type,vid,pid,manufacturer,product,serial_number".to_string()];
            for port in ports {
                lines.push(format!(
                    "{},{},{},{},{},{},{}",
                    port.name,
                    port.kind,
                    port.vid.map(|v| format!("{:04x}", v)).unwrap_or_default(),
                    port.pid.map(|p| format!("{:04x}", p)).unwrap_or_default(),
                    port.manufacturer.as_deref().unwrap_or_default(),
                    port.product.as_deref().unwrap_or_default(),
                    port.serial_number.as_deref().unwrap_or_default(),
                ));
            }
            lines.join("\n")
        }
    };
    Ok(rendered)
}

/// Table row for port listing
#[derive(Tabled)]
struct PortTableRow {
    name: String,
    #[tabled(rename = "type")]
    kind: String,
    id: String,
    manufacturer: String,
    product: String,
}

impl From<&PortDescriptor> for PortTableRow {
    fn from(port: &PortDescriptor) -> Self {
        let id = match (port.vid, port.pid) {
            (Some(vid), Some(pid)) => format!("{:04x}:{:04x}", vid, pid),
            _ => "-".to_string(),
        };
        Self {
            name: port.name.clone(),
            kind: port.kind.to_string(),
            id,
            manufacturer: port.manufacturer.clone().unwrap_or_else(|| "-".to_string()),
            product: port.product.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}
