//! Logging-related error types

use std::{error::Error, fmt, io};

/// Errors that can occur during logging operations
#[derive(Debug)]
pub enum LogError {
    /// I/O error when writing a log sink
    IoError(io::Error),
    /// Failed to create the wire log directory
    DirectoryCreationError(String),
    /// The wire log worker could not take the message
    WorkerError(String),
}

impl fmt::Display for LogError {
    // User-facing error formatting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::IoError(err) => write!(f, "I/O error: {}", err),
            LogError::DirectoryCreationError(msg) => {
                write!(f, "Failed to create directory: {}", msg)
            }
            LogError::WorkerError(msg) => write!(f, "Wire log worker error: {}", msg),
        }
    }
}

// Marker trait for `std::error::Error` compatibility.
impl Error for LogError {}

// Convert I/O errors into logging errors.
impl From<io::Error> for LogError {
    fn from(err: io::Error) -> Self {
        LogError::IoError(err)
    }
}
