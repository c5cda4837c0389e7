//! Command-line argument parsing
//!
//! Parses CLI arguments using the clap library and provides structured access
//! to user-provided options.

use clap::{Arg, Command};
use std::path::PathBuf;

/// Parsed command-line arguments
#[derive(Debug, Clone)]
pub struct MainArgs {
    /// Path to the PBX connection config (overrides PBXD_CONF)
    pub config: Option<PathBuf>,
    /// Socket address to serve HTTP on
    pub listen: String,
    /// Enable debug logging to stderr
    pub debug: bool,
    /// Capture raw PBX traffic to ~/.pbxd/logs/wire/
    pub wire_log: bool,
}

/// Parses command-line arguments using clap.
///
/// # Arguments Supported
/// - `-c, --config` - Path to the JSON connection config
/// - `-L, --listen` - Socket address to serve on (default 0.0.0.0:8080)
/// - `-d, --debug` - Enable debug mode with detailed logging
/// - `-w, --wire-log` - Capture raw PBX traffic for protocol debugging
///
/// # Returns
/// A MainArgs struct containing all parsed arguments
pub fn main_args() -> MainArgs {
    let matches = Command::new("pbxd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("HTTP bridge to the SAT terminal of an Avaya Communication Manager PBX")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to the JSON connection config (overrides PBXD_CONF)")
                .num_args(1),
        )
        .arg(
            Arg::new("listen")
                .short('L')
                .long("listen")
                .value_name("ADDR")
                .help("Socket address to serve HTTP on")
                .num_args(1)
                .default_value("0.0.0.0:8080"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug mode with detailed logging to stderr")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("wire-log")
                .short('w')
                .long("wire-log")
                .help("Capture raw PBX traffic to ~/.pbxd/logs/wire/")
                .action(clap::ArgAction::SetTrue),
        )
        .after_help(
            r#"
PBXD_CONF=pbxd_conf.json PBX_NAME=uw01 pbxd                 # Defaults
pbxd -c pbxd_conf.json -L 127.0.0.1:9000                    # Explicit config and port
pbxd -d -w -c pbxd_conf.json                                # Debug plus wire capture
"#,
        )
        .get_matches();

    MainArgs {
        config: matches.get_one::<String>("config").map(PathBuf::from),
        listen: matches.get_one::<String>("listen").cloned().unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        debug: matches.get_flag("debug"),
        wire_log: matches.get_flag("wire-log"),
    }
}
