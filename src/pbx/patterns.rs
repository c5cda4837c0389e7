//! Prompt and protocol patterns for the SAT terminal.
//!
//! The expect loops in this crate compile every pattern with `(?s)` so `.`
//! crosses line endings, matching how the SAT interleaves escape sequences
//! and CRLF pairs inside a single prompt.

use once_cell::sync::Lazy;
use regex::Regex;

/// Login password prompt.
pub(crate) static PASSWORD_PROMPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"Password:").unwrap());

/// Terminal type selection prompt, e.g.
/// `Terminal Type (513, 715, 4410, 4425, VT220, NTT, W2KTT, SUNT): [513]`
pub(crate) static TERMTYPE_PROMPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)Terminal Type \(.+\): \[.+\]").unwrap());

/// Screen header plus the cleared command line after entering vt220 mode.
pub(crate) static VT220_MODE_PROMPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\x1b\[2;1H.*\x1b\[KCommand: ").unwrap());

/// The `t` the SAT echoes after entering ossi mode.
pub(crate) static OSSI_MODE_PROMPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"t[\r\n]+").unwrap());

// OSSI response lines. The first character of each line identifies it:
// c command echo, f field ids, d data values, e error, n next object,
// t end of output.
pub(crate) static OSSI_FIELD_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"f[\S\t]+[\r\n]+").unwrap());
pub(crate) static OSSI_DATA_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"d[\S\t ]*[\r\n]+").unwrap());
pub(crate) static OSSI_ERROR_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"e[\S\t ]+[\r\n]+").unwrap());
pub(crate) static OSSI_NEXT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"n[\r\n]+").unwrap());
pub(crate) static OSSI_TERM_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"t[\r\n]+").unwrap());
pub(crate) static OSSI_ECHO_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"c [\S ]+[\r\n]+").unwrap());

/// Cleared command line inside the vt220 command loop. The SAT prints a
/// trailing space there; the post-cancel prompt check below does not rely
/// on it.
pub(crate) static VT220_COMMAND_PROMPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[KCommand: ").unwrap());
pub(crate) static VT220_COMMAND_PROMPT_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[KCommand:").unwrap());

/// Paging banner on list output (note the double space).
pub(crate) static VT220_PAGING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"press CANCEL to quit --  press NEXT PAGE to continue").unwrap());

pub(crate) static VT220_SUCCESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"Command successfully completed").unwrap());

/// Cursor parked at the end of a single-page form.
pub(crate) static VT220_END_OF_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[\d;\d\dH\x1b\[0m").unwrap());

/// Cursor parked at the bottom-right of a monitor screen.
pub(crate) static VT220_END_OF_MONITOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[23;80H").unwrap());

/// Logoff confirmation prompt.
pub(crate) static PROCEED_LOGOFF: Lazy<Regex> = Lazy::new(|| Regex::new(r"Proceed With Logoff").unwrap());

/// `Page N of M` marker inside form output.
pub(crate) static PAGE_OF: Lazy<Regex> = Lazy::new(|| Regex::new(r"Page +(\d+) of +(\d+)").unwrap());

/// VT220 cancel function key.
pub(crate) const CANCEL_KEY: &[u8] = b"\x1b[3~";

/// VT220 next-page function key.
pub(crate) const NEXT_PAGE_KEY: &[u8] = b"\x1b[6~";

#[cfg(test)]
#[path = "../test/pbx/patterns.rs"]
mod tests;
