//! OSSI protocol engine
//!
//! The first character of each OSSI line identifies its content:
//! `c` the command being run, `f` a tab separated list of field ids,
//! `d` a tab separated list of data values (a single space clears a field),
//! `e` an error message (two error codes followed by the message),
//! `n` the start of a new item in a list, `t` end of the command output.

use indexmap::IndexMap;
use regex::Regex;

use super::errors::PbxError;
use super::patterns;
use super::response::{OssiRecord, OssiResponse, TerminalMode};
use super::session::Expected;
use super::terminal::Terminal;
use crate::{log_debug, log_error, log_info, log_warn};

// Indexes into the response loop pattern list.
const IDX_FIELDS: usize = 0;
const IDX_DATA: usize = 1;
const IDX_ERROR: usize = 2;
const IDX_NEXT: usize = 3;
const IDX_TERM: usize = 4;

impl Terminal {
    /// Send an OSSI command and collect the response objects.
    ///
    /// `fields` selects which field ids to return, or carries new values on
    /// a change command; with no fields the PBX returns every field. With
    /// `debug` the raw matched lines ride along in the response.
    pub fn ossi_command(&mut self, command: &str, fields: Option<&IndexMap<String, String>>, debug: bool) -> Result<OssiResponse, PbxError> {
        self.ensure_mode(TerminalMode::Ossi)?;
        let timeout = self.command_timeout;
        let session = self.session.as_mut().expect("session present after ensure_mode");

        log_info!("command: {}", command);
        session.send_line(&format!("c {}", command))?;

        if let Some(fields) = fields.filter(|fields| !fields.is_empty()) {
            log_debug!("fields: {:?}", fields);
            // Data values align positionally with the field id list, so both
            // lines must come from the same ordering.
            let mut ids: Vec<&str> = fields.keys().map(String::as_str).collect();
            ids.sort_unstable();
            let id_line = ids.join("\t");
            let id_line = id_line.trim();
            let data_line = ids.iter().map(|id| fields[*id].as_str()).collect::<Vec<_>>().join("\t");
            log_debug!("send: f{}", id_line);
            session.send_line(&format!("f{}", id_line))?;
            log_debug!("send: d{}", data_line);
            session.send_line(&format!("d{}", data_line))?;
        }

        session.send_line("t")?;

        let loop_patterns: [&Regex; 6] = [
            &patterns::OSSI_FIELD_LINE,
            &patterns::OSSI_DATA_LINE,
            &patterns::OSSI_ERROR_LINE,
            &patterns::OSSI_NEXT_LINE,
            &patterns::OSSI_TERM_LINE,
            &patterns::OSSI_ECHO_LINE,
        ];

        let mut response_fields: Vec<String> = Vec::new();
        let mut response_data: Vec<String> = Vec::new();
        let mut response_errors: Vec<String> = Vec::new();
        let mut ossi_objects: Vec<OssiRecord> = Vec::new();
        let mut raw_lines: Vec<String> = Vec::new();
        let mut field_lines = 0usize;

        loop {
            match session.expect(&loop_patterns, timeout) {
                Expected::Timeout { before } => {
                    response_errors.push("PBX timeout".to_string());
                    log_error!("PBX timeout: {}\n{}", command, before);
                    break;
                }
                Expected::Eof { before } => {
                    response_errors.push("PBX connection failed with EOF".to_string());
                    log_error!("PBX connection failed with EOF: {}\n{}", command, before);
                    break;
                }
                Expected::Match { index, matched, .. } => {
                    log_debug!("matched: {:?}", matched);
                    raw_lines.push(matched.clone());
                    let payload = matched[1..].trim_end_matches(['\r', '\n']);
                    match index {
                        IDX_FIELDS => {
                            field_lines += 1;
                            if field_lines > 1 {
                                // Some commands emit more than one f line;
                                // the ids accumulate in wire order.
                                log_warn!("field id line #{} received, appending", field_lines);
                            }
                            let field_ids: Vec<String> = payload.split('\t').map(str::to_string).collect();
                            log_debug!("f {} {:?}", field_ids.len(), field_ids);
                            response_fields.extend(field_ids);
                        }
                        IDX_DATA => {
                            let field_values: Vec<String> = payload.split('\t').map(str::to_string).collect();
                            log_debug!("d {} {:?}", field_values.len(), field_values);
                            response_data.extend(field_values);
                        }
                        IDX_ERROR => {
                            let error_message = parse_error_line(payload);
                            log_warn!("error: {}", error_message);
                            response_errors.push(error_message);
                        }
                        IDX_NEXT => {
                            log_debug!("object complete");
                            close_record(&response_fields, &mut response_data, &mut ossi_objects);
                        }
                        IDX_TERM => {
                            log_info!("command output complete");
                            close_record(&response_fields, &mut response_data, &mut ossi_objects);
                            break;
                        }
                        _ => {} // echoed command
                    }
                }
            }
        }

        let response = OssiResponse {
            ossi_objects,
            error: if response_errors.is_empty() {
                None
            } else {
                Some(response_errors.join("\n"))
            },
            debug: if debug { Some(raw_lines) } else { None },
        };
        log_debug!("{:?}", response);
        Ok(response)
    }
}

/// `e<code1> <code2> <code3> <message...>` becomes `"<code2> <message>"`.
/// Anything shorter comes back whole rather than losing the text.
fn parse_error_line(payload: &str) -> String {
    let parts: Vec<&str> = payload.splitn(4, ' ').collect();
    match parts.as_slice() {
        [_code1, code2, _code3, message] => format!("{} {}", code2, message),
        _ => payload.to_string(),
    }
}

/// Zip the pending data values with the current field id list into a record.
/// Data resets between records; the field list carries over.
fn close_record(fields: &[String], data: &mut Vec<String>, objects: &mut Vec<OssiRecord>) {
    if data.is_empty() {
        return;
    }
    if fields.len() != data.len() {
        log_error!("corrupt object: {} fields, {} values", fields.len(), data.len());
    }
    let mut record = OssiRecord::new();
    for (field_id, value) in fields.iter().zip(data.iter()) {
        record.insert(field_id.clone(), value.clone());
    }
    if record.len() != fields.len().min(data.len()) {
        // There have been cases of duplicate field ids in some commands.
        log_error!("duplicate field ids detected {:?} != {:?}", fields, record.keys().collect::<Vec<_>>());
    }
    objects.push(record);
    data.clear();
}

#[cfg(test)]
#[path = "../test/pbx/ossi.rs"]
mod tests;
