use std::error;
use std::fmt;
use std::io;

/// Represents errors that can occur while talking to the sensor node.
#[derive(Debug)]
pub enum Error {
    /// The execution of an operation failed. Contains a description of the failure.
    OperationFail { description: String },

    /// The execution of an operation timed out.
    OperationTimeout,

    /// Received data is invalid according to the link framing. Contains a description of the violation.
    ProtocolError { description: String },

    /// The buffer provided is too small for frame encoding.
    BufferTooSmall,

    /// An I/O error occurred on the underlying stream (e.g., the serial bridge to the BLE adapter).
    IoError(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OperationFail { description } => write!(f, "operation failed: {}", description),
            Error::OperationTimeout => write!(f, "operation timeout"),
            Error::ProtocolError { description } => write!(f, "protocol error: {}", description),
            Error::BufferTooSmall => write!(f, "buffer is too small for frame encoding"),
            Error::IoError(err) => write!(f, "io error: {}", err),
        }
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IoError(err)
    }
}

/// A specialized `Result` type for node link operations.
pub type Result<T> = std::result::Result<T, Error>;
