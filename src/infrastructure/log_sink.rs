// Session transcript sinks
use crate::domain::error::{SerialFlowError, SerialFlowResult};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const PRODUCT_NAME: &str = "SerialFlow";

/// Append-only destination for transcript lines. Owned by whoever renders
/// session events, never by the session itself.
pub trait LogSink: Send {
    /// Appends one complete line. Implementations persist it before
    /// returning.
    fn append_line(&mut self, line: &str) -> io::Result<()>;
}

impl LogSink for Vec<String> {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// `=== SerialFlow Log Started: 2024-05-01 13:45:09 ===`
pub fn start_marker(started_at: &DateTime<Local>) -> String {
    format!(
        "=== {} Log Started: {} ===",
        PRODUCT_NAME,
        started_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// `SerialFlow_20240501_134509.log`
pub fn default_file_name(now: &DateTime<Local>) -> String {
    format!("{}_{}.log", PRODUCT_NAME, now.format("%Y%m%d_%H%M%S"))
}

/// Transcript file opened in append mode, flushed after every line.
pub struct FileLogSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileLogSink {
    /// Opens `path` for appending and writes the start marker. A directory
    /// gets a timestamped file name inside it.
    pub fn start(path: impl AsRef<Path>) -> SerialFlowResult<Self> {
        let now = Local::now();
        let path = path.as_ref();
        let path = if path.is_dir() {
            path.join(default_file_name(&now))
        } else {
            path.to_path_buf()
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SerialFlowError::Output(format!("Failed to open log file {}: {}", path.display(), e)))?;

        let mut sink = Self {
            path,
            writer: BufWriter::new(file),
        };
        sink.append_line(&start_marker(&now))?;
        info!("Logging session to {}", sink.path.display());
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
