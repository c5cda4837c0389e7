//! Terminal driver for the Avaya Communication Manager SAT interface
//!
//! Owns one child-process session to the PBX and translates command
//! requests into the interactive terminal conversation the switch imposes:
//! expect loops over a PTY, the ossi/vt220 terminal type dance, OSSI line
//! parsing and vt220 screen capture.
//!
//! The ossi interface is the programmer's interface; `Terminal::ossi_command`
//! is what most callers want. `Terminal::vt220_command` captures the
//! formatted screens an interactive user would see.

mod emulator;
mod errors;
mod ossi;
mod patterns;
mod response;
mod session;
mod terminal;
mod vt220;

pub use errors::PbxError;
pub use response::{OssiRecord, OssiResponse, PbxResponse, TerminalMode, Vt220Response};
pub use terminal::Terminal;

#[cfg(test)]
pub(crate) use session::script::ScriptedPbx;
