//! Logging for the pbxd worker
//!
//! Provides:
//! - Leveled, timestamped logging to stderr (collected by the supervisor)
//! - Opt-in capture of raw PBX traffic to a dated file for protocol debugging
//!
//! Debug and wire logging are gated by global flags so the hot paths stay
//! cheap when they are off.

mod errors;
mod formatter;
mod macros;
mod stderr;
mod wire;

pub use errors::LogError;

use std::sync::atomic::{AtomicBool, Ordering};

// Global flags for enabling different logging types
static DEBUG_MODE: AtomicBool = AtomicBool::new(false);
static WIRE_LOGGING: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

#[derive(Clone, Default)]
pub struct Logger {
    stderr_logger: stderr::StderrLogger,
    wire_logger: wire::WireLogger,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            stderr_logger: stderr::StderrLogger::new(),
            wire_logger: wire::WireLogger::new(),
        }
    }

    pub fn enable_debug(&self) {
        DEBUG_MODE.store(true, Ordering::SeqCst);
    }

    pub fn enable_wire_logging(&self) {
        WIRE_LOGGING.store(true, Ordering::SeqCst);
    }

    pub fn is_debug_enabled(&self) -> bool {
        DEBUG_MODE.load(Ordering::SeqCst)
    }

    pub fn is_wire_logging_enabled(&self) -> bool {
        WIRE_LOGGING.load(Ordering::SeqCst)
    }

    pub fn log_debug(&self, message: &str) -> Result<(), LogError> {
        if self.is_debug_enabled() {
            self.stderr_logger.log(LogLevel::Debug, message)?;
        }
        Ok(())
    }

    pub fn log_info(&self, message: &str) -> Result<(), LogError> {
        self.stderr_logger.log(LogLevel::Info, message)
    }

    pub fn log_warn(&self, message: &str) -> Result<(), LogError> {
        self.stderr_logger.log(LogLevel::Warning, message)
    }

    pub fn log_error(&self, message: &str) -> Result<(), LogError> {
        self.stderr_logger.log(LogLevel::Error, message)
    }

    pub fn log_wire(&self, chunk: &str) -> Result<(), LogError> {
        if self.is_wire_logging_enabled() {
            self.wire_logger.log(chunk)?;
        }
        Ok(())
    }
}
