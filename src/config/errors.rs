//! Configuration-related error types

use std::{error::Error, fmt, io};

/// Errors that can occur during configuration loading and processing
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error when reading the config file
    IoError(io::Error),
    /// No config path given on the command line or in `PBXD_CONF`
    MissingPath,
    /// The config file is not the expected JSON shape
    ParseError(serde_json::Error),
    /// A required environment variable is unset
    MissingEnv(&'static str),
    /// `PBX_COMMAND_TIMEOUT` is not a number of seconds
    InvalidTimeout(String),
}

impl fmt::Display for ConfigError {
    // User-facing error formatting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(err) => write!(f, "I/O error: {}", err),
            ConfigError::MissingPath => write!(f, "No config path; pass --config or set PBXD_CONF"),
            ConfigError::ParseError(err) => write!(f, "Failed to parse configuration file: {}", err),
            ConfigError::MissingEnv(name) => write!(f, "Environment variable {} is not set", name),
            ConfigError::InvalidTimeout(raw) => write!(f, "PBX_COMMAND_TIMEOUT is not a number of seconds: {}", raw),
        }
    }
}

// Marker trait for `std::error::Error` compatibility.
impl Error for ConfigError {}

// Convert I/O errors into config errors.
impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err)
    }
}
