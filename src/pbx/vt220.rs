//! VT220 protocol engine
//!
//! Runs a command in the screen-oriented terminal and captures each page as
//! a rendered 80x24 snapshot. Forms page with `Page N of M`, list output
//! pages with an explicit banner, and monitor screens park the cursor at
//! the bottom-right corner.

use regex::Regex;

use super::emulator::ScreenBuffer;
use super::errors::PbxError;
use super::patterns;
use super::response::{TerminalMode, Vt220Response};
use super::session::Expected;
use super::terminal::Terminal;
use crate::{log_debug, log_error, log_info, log_warn};

const IDX_PROMPT: usize = 0;
const IDX_PAGING: usize = 1;

/// The status row (line 23 on the 1-based screen) where the SAT reports
/// success or the reason a command was rejected.
const STATUS_ROW: usize = 22;
const SUCCESS_MESSAGE: &str = "Command successfully completed";

impl Terminal {
    /// Run a command in the vt220 terminal and return the rendered screens.
    pub fn vt220_command(&mut self, command: &str) -> Result<Vt220Response, PbxError> {
        self.ensure_mode(TerminalMode::Vt220)?;
        let timeout = self.command_timeout;
        let session = self.session.as_mut().expect("session present after ensure_mode");

        log_info!("command: {}", command);
        session.send_line(command)?;

        let loop_patterns: [&Regex; 5] = [
            &patterns::VT220_COMMAND_PROMPT,
            &patterns::VT220_PAGING,
            &patterns::VT220_SUCCESS,
            &patterns::VT220_END_OF_PAGE,
            &patterns::VT220_END_OF_MONITOR,
        ];

        let mut screens: Vec<String> = Vec::new();
        let mut response_error: Option<String> = None;
        let mut more_pages = true;
        while more_pages {
            more_pages = false;
            match session.expect(&loop_patterns, timeout) {
                Expected::Timeout { before } => {
                    response_error = Some("PBX timeout".to_string());
                    log_error!("PBX timeout: {}\n{}", command, before);
                }
                Expected::Eof { before } => {
                    response_error = Some("PBX connection failed with EOF".to_string());
                    log_error!("PBX connection failed with EOF: {}\n{}", command, before);
                }
                Expected::Match { index, before, matched } => {
                    log_debug!("{} saving screen:\n{:?}", index, matched);
                    let mut screen = ScreenBuffer::new();
                    screen.feed(&before);
                    screens.push(screen.render());

                    if index == IDX_PROMPT {
                        // Back at the command prompt; the status row carries
                        // the rejection text when the command did not take.
                        let pbx_message = screen.row_text(STATUS_ROW).trim().to_string();
                        if !pbx_message.is_empty() && pbx_message != SUCCESS_MESSAGE {
                            log_warn!("{}", pbx_message);
                            response_error = Some(pbx_message);
                        }
                    } else if index == IDX_PAGING {
                        more_pages = true;
                        session.send_bytes(patterns::NEXT_PAGE_KEY)?;
                    } else if let Some(captures) = patterns::PAGE_OF.captures(&before) {
                        let (page, of) = (captures.get(1).map_or("", |m| m.as_str()), captures.get(2).map_or("", |m| m.as_str()));
                        if page < of {
                            log_debug!("page {} of {}: requesting next page", page, of);
                            more_pages = true;
                            session.send_bytes(patterns::NEXT_PAGE_KEY)?;
                        }
                    }
                }
            }
        }
        log_info!("command complete");

        // Return to the vt220 prompt and consume it.
        session.send_bytes(patterns::CANCEL_KEY)?;
        match session.expect(&[&patterns::VT220_COMMAND_PROMPT_BARE], session.default_timeout()) {
            Expected::Timeout { before } => {
                response_error = Some("Timeout on vt220_command".to_string());
                log_error!("Timeout on vt220_command: {}\n{}", command, before);
            }
            Expected::Eof { before } => {
                response_error = Some("Connection failed with EOF on vt220_command".to_string());
                log_error!("Connection failed with EOF on vt220_command: {}\n{}", command, before);
            }
            Expected::Match { .. } => {}
        }

        Ok(Vt220Response {
            screens,
            error: response_error,
        })
    }
}

#[cfg(test)]
#[path = "../test/pbx/vt220.rs"]
mod tests;
