//! Terminal state machine and session lifecycle
//!
//! One `Terminal` owns one child session to the PBX. Commands are strictly
//! serialized by the caller (the HTTP layer holds a mutex across each
//! command); interleaving two commands on one session corrupts its state.

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretBox};
use std::time::Duration;

use super::errors::PbxError;
use super::patterns;
use super::response::{PbxResponse, TerminalMode};
use super::session::{ChildSession, Expected};
use crate::{log_debug, log_error, log_info, log_warn};

/// Timeout for mode prompts, logoff and other housekeeping expects.
const SESSION_TIMEOUT: Duration = Duration::from_secs(5);
/// Some switches take a while to present the login prompt.
const PASSWORD_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Terminal {
    connection_command: String,
    #[allow(dead_code)] // informational; the connection command carries the login
    pbx_username: String,
    pbx_password: SecretBox<String>,
    pub(crate) session: Option<ChildSession>,
    pub(crate) connected_mode: Option<TerminalMode>,
    pub(crate) command_timeout: Duration,
}

impl Terminal {
    pub fn new(connection_command: String, pbx_username: String, pbx_password: SecretBox<String>, command_timeout: Duration) -> Self {
        Self {
            connection_command,
            pbx_username,
            pbx_password,
            session: None,
            connected_mode: None,
            command_timeout,
        }
    }

    pub fn connected_mode(&self) -> Option<TerminalMode> {
        self.connected_mode
    }

    /// Connect to the PBX: spawn the connection command, answer the password
    /// prompt and land in ossi mode.
    pub fn connect(&mut self) -> Result<(), PbxError> {
        log_info!("Connecting to pbx: {}", self.connection_command);
        let mut session = ChildSession::spawn(&self.connection_command, SESSION_TIMEOUT)?;

        match session.expect(&[&patterns::PASSWORD_PROMPT], PASSWORD_TIMEOUT) {
            Expected::Timeout { before } => {
                log_error!("Connection timeout at password:\n{}", before);
                return Err(PbxError::ConnectTimeout("at password".to_string()));
            }
            Expected::Eof { before } => {
                // The last output line names the refusal, e.g. "Too many logins".
                log_error!("Connection failed with EOF at password:\n{}", before);
                return Err(PbxError::ConnectFailed(last_line(&before)));
            }
            Expected::Match { .. } => {
                log_debug!("Sending pbx_password");
                session.send_line(self.pbx_password.expose_secret())?;
            }
        }

        self.session = Some(session);
        self.connected_mode = None;
        self.ensure_mode(TerminalMode::Ossi)
    }

    /// Log off politely, then terminate the child. Always leaves the
    /// terminal disconnected, whatever the PBX thought about it.
    pub fn disconnect(&mut self) {
        log_info!("Disconnecting from pbx");
        if let Some(session) = self.session.as_mut() {
            let farewell = if self.connected_mode == Some(TerminalMode::Vt220) {
                session
                    .send_bytes(patterns::CANCEL_KEY)
                    .and_then(|_| session.send_line("logoff"))
            } else {
                session.send_line("c logoff").and_then(|_| session.send_line("t"))
            };
            if let Err(err) = farewell {
                log_warn!("Logoff write failed: {}", err);
            } else {
                match session.expect(&[&patterns::PROCEED_LOGOFF], session.default_timeout()) {
                    Expected::Timeout { before } => {
                        log_error!("Timeout during disconnect:\n{}", before);
                    }
                    Expected::Eof { before } => {
                        log_error!("Connection failed with EOF during disconnect:\n{}", before);
                    }
                    Expected::Match { .. } => {
                        let _ = session.send_line("y");
                    }
                }
            }
            session.close();
        }
        self.session = None;
        self.connected_mode = None;
        log_info!("Connection closed");
    }

    pub fn reconnect(&mut self) -> Result<(), PbxError> {
        log_warn!("Reconnecting...");
        self.disconnect();
        self.connect()
    }

    /// Put the session in `target` mode, reconnecting first if the child is
    /// gone. A no-op when the mode already matches.
    pub fn ensure_mode(&mut self, target: TerminalMode) -> Result<(), PbxError> {
        let alive = self.session.as_mut().map(ChildSession::is_alive).unwrap_or(false);
        if !alive {
            log_error!("dead session");
            // A second failed connect surfaces as the connect error rather
            // than being masked by the mode switch.
            self.reconnect()?;
        }

        if self.connected_mode == Some(target) {
            return Ok(());
        }

        let current = self.connected_mode;
        let session = self.session.as_mut().expect("session present after liveness check");

        match current {
            Some(TerminalMode::Vt220) => session.send_line("newterm")?,
            Some(TerminalMode::Ossi) => {
                session.send_line("c newterm")?;
                session.send_line("t")?;
            }
            // Right after the password the PBX prompts on its own.
            None => {}
        }

        // Terminal Type (513, 715, 4410, 4425, VT220, NTT, W2KTT, SUNT): [513]
        match session.expect(&[&patterns::TERMTYPE_PROMPT], session.default_timeout()) {
            Expected::Timeout { before } => {
                log_error!("Timeout on termtype:\n{}", before);
                return Err(PbxError::ModeSwitchFailed(format!("timeout at terminal type prompt: {}", last_line(&before))));
            }
            Expected::Eof { before } => {
                log_error!("Connection failed with EOF at termtype:\n{}", before);
                return Err(PbxError::ModeSwitchFailed(format!("EOF at terminal type prompt: {}", last_line(&before))));
            }
            Expected::Match { matched, .. } => {
                log_debug!("selecting termtype {} from {}", target.wire_token(), matched.trim());
                session.send_line(target.wire_token())?;
            }
        }

        // Verify and consume the mode entry prompt.
        let entry_prompt = match target {
            TerminalMode::Vt220 => &*patterns::VT220_MODE_PROMPT,
            TerminalMode::Ossi => &*patterns::OSSI_MODE_PROMPT,
        };
        match session.expect(&[entry_prompt], session.default_timeout()) {
            Expected::Timeout { before } => {
                log_error!("Timeout on command prompt verify:\n{}", before);
                return Err(PbxError::ModeSwitchFailed(format!("timeout at {} prompt: {}", target, last_line(&before))));
            }
            Expected::Eof { before } => {
                log_error!("Connection failed with EOF at command prompt verify:\n{}", before);
                return Err(PbxError::ModeSwitchFailed(format!("EOF at {} prompt: {}", target, last_line(&before))));
            }
            Expected::Match { .. } => {}
        }

        self.connected_mode = Some(target);
        Ok(())
    }

    /// Run a command with the requested termtype.
    ///
    /// Wire-level errors come back inside the response; only connection
    /// establishment raises.
    pub fn send_pbx_command(
        &mut self,
        termtype: &str,
        command: &str,
        fields: Option<&IndexMap<String, String>>,
        debug: bool,
    ) -> Result<PbxResponse, PbxError> {
        match TerminalMode::from_request_token(termtype) {
            Some(TerminalMode::Vt220) => Ok(PbxResponse::Vt220(self.vt220_command(command)?)),
            Some(TerminalMode::Ossi) => Ok(PbxResponse::Ossi(self.ossi_command(command, fields, debug)?)),
            None => Ok(PbxResponse::Rejected {
                error: "Unknown termtype. Must be ossi or vt220.".to_string(),
            }),
        }
    }
}

/// Last non-empty output line, used to surface refusal banners.
pub(crate) fn last_line(text: &str) -> String {
    text.trim().lines().last().unwrap_or("").trim().to_string()
}

#[cfg(test)]
impl Terminal {
    /// A terminal wired to a scripted session instead of a child process.
    pub(crate) fn scripted(mode: Option<TerminalMode>, command_timeout: Duration) -> (Self, super::session::script::ScriptedPbx) {
        let (session, pbx) = super::session::script::scripted_session(command_timeout);
        let terminal = Self {
            connection_command: "ssh admin@pbx.test".to_string(),
            pbx_username: "admin".to_string(),
            pbx_password: SecretBox::new(Box::new("hunter2".to_string())),
            session: Some(session),
            connected_mode: mode,
            command_timeout,
        };
        (terminal, pbx)
    }
}

#[cfg(test)]
#[path = "../test/pbx/terminal.rs"]
mod tests;
