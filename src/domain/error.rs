use thiserror::Error;

/// Discriminant of [`SessionError`], for callers that only need to branch on
/// the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OpenFailed,
    NotConnected,
    WriteFailed,
    DeviceError,
    ResourceLost,
}

/// Failures of the connection session.
///
/// `OpenFailed`, `NotConnected` and `WriteFailed` are returned from the
/// operation that caused them. `DeviceError` and `ResourceLost` happen
/// asynchronously and only ever reach observers as `ErrorOccurred` events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Failed to open serial port: {0}")]
    OpenFailed(String),

    #[error("Device not connected")]
    NotConnected,

    #[error("Failed to write data: {0}")]
    WriteFailed(String),

    #[error("Device error: {0}")]
    DeviceError(String),

    #[error("Device lost: {0}")]
    ResourceLost(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::OpenFailed(_) => ErrorKind::OpenFailed,
            SessionError::NotConnected => ErrorKind::NotConnected,
            SessionError::WriteFailed(_) => ErrorKind::WriteFailed,
            SessionError::DeviceError(_) => ErrorKind::DeviceError,
            SessionError::ResourceLost(_) => ErrorKind::ResourceLost,
        }
    }

    /// Host diagnostic text without the category prefix.
    pub fn diagnostic(&self) -> &str {
        match self {
            SessionError::OpenFailed(msg)
            | SessionError::WriteFailed(msg)
            | SessionError::DeviceError(msg)
            | SessionError::ResourceLost(msg) => msg,
            SessionError::NotConnected => "Port is not open",
        }
    }
}

/// SerialFlow unified error type
#[derive(Error, Debug)]
pub enum SerialFlowError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type SerialFlowResult<T> = Result<T, SerialFlowError>;
