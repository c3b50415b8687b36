use crate::cli::args::{Args, Command, ConfigArgs, ConfigCommand, DataFormat, MonitorArgs, SendArgs};
use crate::cli::monitor::{send_typed_line, ConsoleObserver, TranscriptFormatter};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::session::ConnectionSession;
use crate::domain::config::{LineEndingMode, SerialFlowConfig};
use crate::domain::error::{SerialFlowError, SerialFlowResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::log_sink::{FileLogSink, LogSink};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::serial::PortCatalog;
use chrono::Local;
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Execute CLI command
pub async fn execute_command(args: Args) -> SerialFlowResult<()> {
    let writer = ConsoleWriter::new(args.output);

    let config_manager = ConfigManager::new()?;
    let config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(config_path)?
    } else {
        config_manager.load_config()?
    };

    if !args.quiet {
        let level = if args.verbose { "debug" } else { config.global.log_level.as_str() };
        init_logging(level)?;
    }

    match args.command {
        Command::List => {
            writer.write_ports(&PortCatalog::list())?;
            Ok(())
        }
        Command::Monitor(monitor_args) => execute_monitor(monitor_args, &writer, &config).await,
        Command::Send(send_args) => execute_send(send_args, &writer, &config),
        Command::Config(config_args) => execute_config_command(config_args, &writer, &config, &config_manager),
        Command::Version => {
            writer.write_message(&format!("serialflow {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

async fn execute_monitor(args: MonitorArgs, writer: &ConsoleWriter, config: &SerialFlowConfig) -> SerialFlowResult<()> {
    let defaults = &config.session;
    let (port, session_config) = args.connection.resolve(defaults)?;
    let line_ending = args.line_ending.map(LineEndingMode::from).unwrap_or(defaults.line_ending);
    let display_mode = args.display.map(Into::into).unwrap_or(defaults.display_mode);
    let poll_ms = args.poll_ms.unwrap_or(defaults.poll_interval_ms).max(1);

    let mut session = ConnectionSession::new();
    session.open(&port, session_config)?;

    let sink: Option<Box<dyn LogSink>> = match &args.log {
        Some(path) => Some(Box::new(FileLogSink::start(path)?)),
        None => None,
    };
    let formatter = TranscriptFormatter::new(display_mode, args.show_timestamp(defaults));
    let mut observer = ConsoleObserver::new(formatter, sink);
    if let Some(listed) = PortCatalog::find(&port.name) {
        debug!("{}: {}", listed.name, listed.summary());
    }
    observer.emit_line(&formatter.banner(&port.name, session_config.baud_rate, &Local::now()));
    session.subscribe(observer);

    writer.write_message(&format!(
        "Monitoring {} ({}, line ending {}, {} view). Press Ctrl+C to stop.",
        port.name, session_config, line_ending, display_mode
    ))?;

    let mut lines = spawn_stdin_reader();
    let mut tick = tokio::time::interval(Duration::from_millis(poll_ms));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                session.on_ready_read();
                if !session.is_open() {
                    break;
                }
            }
            line = lines.recv(), if stdin_open => match line {
                Some(line) => {
                    if let Err(e) = send_typed_line(&mut session, &line, line_ending) {
                        writer.write_error(&e.to_string())?;
                    }
                    if !session.is_open() {
                        break;
                    }
                }
                None => {
                    debug!("stdin closed; monitoring continues");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => {
                info!("Interrupted, closing '{}'", port.name);
                break;
            }
        }
    }

    session.close();
    Ok(())
}

/// Forwards stdin lines from a plain thread so a pending read never holds
/// up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

fn execute_send(args: SendArgs, writer: &ConsoleWriter, config: &SerialFlowConfig) -> SerialFlowResult<()> {
    let (port, session_config) = args.connection.resolve(&config.session)?;
    let line_ending = args.line_ending.map(LineEndingMode::from).unwrap_or(config.session.line_ending);

    let mut session = ConnectionSession::new();
    session.open(&port, session_config)?;

    let result = match args.format {
        DataFormat::Text => session.send(&args.data, line_ending),
        format => {
            let bytes = parse_data(&args.data, format)?;
            session.send_bytes(&bytes)
        }
    };
    session.close();
    result?;

    writer.write_message(&format!("Sent {} data to {}", args.format, port.name))?;
    Ok(())
}

fn execute_config_command(
    args: ConfigArgs,
    writer: &ConsoleWriter,
    config: &SerialFlowConfig,
    config_manager: &ConfigManager,
) -> SerialFlowResult<()> {
    match args.command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Validate { file } => {
            let result = match &file {
                Some(path) => config_manager.load_config_from_path(path),
                None => config_manager.load_config(),
            };
            match (result, file) {
                (Ok(_), Some(path)) => {
                    writer.write_message(&format!("Configuration file '{}' is valid", path.display()))?
                }
                (Ok(_), None) => writer.write_message("Current configuration is valid")?,
                (Err(e), _) => writer.write_error(&format!("Configuration validation failed: {}", e))?,
            }
            Ok(())
        }
        ConfigCommand::Init { path, global } => {
            let target = match (path, global) {
                (Some(path), _) => path,
                (None, true) => config_manager.global_config_path().to_path_buf(),
                (None, false) => {
                    let current_dir = std::env::current_dir().map_err(|e| SerialFlowError::Config {
                        message: format!("Failed to get current directory: {}", e),
                    })?;
                    ConfigManager::project_config_path_in(&current_dir)
                }
            };
            config_manager.init_config(&target)?;
            writer.write_message(&format!("Configuration initialized at '{}'", target.display()))?;
            Ok(())
        }
        ConfigCommand::Path => {
            writer.write_message(&format!("Global:  {}", config_manager.global_config_path().display()))?;
            let project = config_manager
                .project_config_path()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(none)".to_string());
            writer.write_message(&format!("Project: {}", project))?;
            Ok(())
        }
    }
}

/// Decodes a command-line payload into raw bytes.
pub fn parse_data(data: &str, format: DataFormat) -> SerialFlowResult<Vec<u8>> {
    match format {
        DataFormat::Text => Ok(data.as_bytes().to_vec()),
        DataFormat::Hex => {
            let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
            hex::decode(&cleaned).map_err(|e| SerialFlowError::InvalidInput(format!("Invalid hex data: {}", e)))
        }
        DataFormat::Base64 => {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(data.trim())
                .map_err(|e| SerialFlowError::InvalidInput(format!("Invalid base64 data: {}", e)))
        }
    }
}
