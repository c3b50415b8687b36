use crate::core::codec;
use crate::core::session::{ConnectionSession, SessionEvent, SessionObserver};
use crate::domain::config::{DisplayMode, LineEndingMode};
use crate::domain::error::SessionError;
use crate::infrastructure::log_sink::LogSink;
use chrono::{DateTime, Local};
use tracing::warn;

/// Turns session events into transcript lines.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptFormatter {
    pub display_mode: DisplayMode,
    pub show_timestamp: bool,
}

impl TranscriptFormatter {
    pub fn new(display_mode: DisplayMode, show_timestamp: bool) -> Self {
        Self {
            display_mode,
            show_timestamp,
        }
    }

    /// Line for `event` at time `at`, or `None` for events that are not
    /// shown. A successful open is announced by the caller's banner.
    pub fn format_event(&self, event: &SessionEvent, at: &DateTime<Local>) -> Option<String> {
        let body = match event {
            SessionEvent::DataReceived(chunk) => format!("RX: {}", self.render(&chunk.bytes)),
            SessionEvent::DataSent(bytes) => format!("TX: {}", self.render(bytes)),
            SessionEvent::ErrorOccurred(error) => format!("Error: {}", error.diagnostic()),
            SessionEvent::ConnectionChanged(false) => "Disconnected".to_string(),
            SessionEvent::ConnectionChanged(true) => return None,
        };
        Some(self.stamp(body, at))
    }

    /// `Connected to /dev/ttyUSB0 at 115200 baud`
    pub fn banner(&self, port: &str, baud_rate: u32, at: &DateTime<Local>) -> String {
        self.stamp(format!("Connected to {} at {} baud", port, baud_rate), at)
    }

    fn render(&self, bytes: &[u8]) -> String {
        let rendered = codec::decode_for_display(bytes, self.display_mode);
        match self.display_mode {
            DisplayMode::Text => rendered.trim().to_string(),
            DisplayMode::Hex => rendered,
        }
    }

    fn stamp(&self, body: String, at: &DateTime<Local>) -> String {
        if self.show_timestamp {
            format!("[{}] {}", at.format("%H:%M:%S"), body)
        } else {
            body
        }
    }
}

/// Prints the transcript to stdout and mirrors it into an optional sink.
pub struct ConsoleObserver {
    formatter: TranscriptFormatter,
    sink: Option<Box<dyn LogSink>>,
}

impl ConsoleObserver {
    pub fn new(formatter: TranscriptFormatter, sink: Option<Box<dyn LogSink>>) -> Self {
        Self { formatter, sink }
    }

    /// Prints and logs a line that did not come from a session event.
    pub fn emit_line(&mut self, line: &str) {
        println!("{}", line);
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.append_line(line) {
                warn!("Failed to write transcript line: {}", e);
            }
        }
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_event(&mut self, event: &SessionEvent) {
        if let Some(line) = self.formatter.format_event(event, &Local::now()) {
            self.emit_line(&line);
        }
    }
}

/// Sends a line typed at the console. Empty lines are skipped and
/// reported as `Ok(false)`.
pub fn send_typed_line(
    session: &mut ConnectionSession,
    line: &str,
    line_ending: LineEndingMode,
) -> Result<bool, SessionError> {
    if line.is_empty() {
        return Ok(false);
    }
    session.send(line, line_ending).map(|()| true)
}
