//! Response shapes handed to the HTTP layer.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// The two terminal types the SAT offers for scripted use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalMode {
    Ossi,
    Vt220,
}

impl TerminalMode {
    /// Token sent at the terminal type prompt.
    pub fn wire_token(self) -> &'static str {
        match self {
            TerminalMode::Ossi => "ossi4",
            TerminalMode::Vt220 => "vt220",
        }
    }

    /// Parse the public request token.
    pub fn from_request_token(token: &str) -> Option<Self> {
        match token {
            "ossi" => Some(TerminalMode::Ossi),
            "vt220" => Some(TerminalMode::Vt220),
            _ => None,
        }
    }
}

impl fmt::Display for TerminalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalMode::Ossi => write!(f, "ossi"),
            TerminalMode::Vt220 => write!(f, "vt220"),
        }
    }
}

/// One OSSI object: field ids in the order the PBX listed them.
pub type OssiRecord = IndexMap<String, String>;

#[derive(Debug, Default, Serialize)]
pub struct OssiResponse {
    pub ossi_objects: Vec<OssiRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Vec<String>>,
}

#[derive(Debug, Default, Serialize)]
pub struct Vt220Response {
    pub screens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What `send_pbx_command` hands back; serializes to the wire shape of the
/// underlying variant.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PbxResponse {
    Ossi(OssiResponse),
    Vt220(Vt220Response),
    Rejected { error: String },
}

impl PbxResponse {
    pub fn error(&self) -> Option<&str> {
        match self {
            PbxResponse::Ossi(response) => response.error.as_deref(),
            PbxResponse::Vt220(response) => response.error.as_deref(),
            PbxResponse::Rejected { error } => Some(error),
        }
    }
}
