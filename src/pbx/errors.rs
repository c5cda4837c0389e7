//! PBX driver error types

use std::{error::Error, fmt, io};

/// Errors raised while establishing or driving the PBX session.
///
/// Wire-level failures during a command (timeout, EOF, `e` lines) are folded
/// into the command response instead; only connection establishment and
/// writes to the child surface here.
#[derive(Debug)]
pub enum PbxError {
    /// The connection command could not be spawned
    Spawn(String),
    /// No password prompt within the connect window; carries the wait context
    ConnectTimeout(String),
    /// The child exited before login completed; carries its last output line
    ConnectFailed(String),
    /// The terminal type dance did not reach the requested mode
    ModeSwitchFailed(String),
    /// Writing to the child failed
    Write(io::Error),
}

impl fmt::Display for PbxError {
    // User-facing error formatting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PbxError::Spawn(msg) => write!(f, "Failed to spawn connection command: {}", msg),
            PbxError::ConnectTimeout(context) => write!(f, "Connection timeout {}", context),
            PbxError::ConnectFailed(msg) => write!(f, "Connection failed with EOF: {}", msg),
            PbxError::ModeSwitchFailed(msg) => write!(f, "Terminal type switch failed: {}", msg),
            PbxError::Write(err) => write!(f, "Write to PBX session failed: {}", err),
        }
    }
}

// Marker trait for `std::error::Error` compatibility.
impl Error for PbxError {}
