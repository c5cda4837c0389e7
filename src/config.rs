//! Runtime configuration
//!
//! Connection details live in a JSON file:
//!
//! ```json
//! {
//!     "connection_command": "/usr/bin/ssh -o \"StrictHostKeyChecking no\" user@host",
//!     "pbx_username": "login",
//!     "pbx_password": "password"
//! }
//! ```
//!
//! An SSH connection is best. PBX upgrades sometimes change the SSH host key
//! so you can give up some security for more reliable connectivity with
//! `-o "StrictHostKeyChecking no"`. Some old systems might only have telnet
//! (`/usr/bin/telnet host port`), and the old data modules had trouble with
//! telnet but a direct ssl connection worked
//! (`/usr/bin/openssl s_client -quiet -connect host:port`).
//!
//! The file path comes from `--config` or `PBXD_CONF`. The rest comes from
//! the environment: `PBX_NAME` (identity for the URL path match),
//! `PBX_COMMAND_TIMEOUT` (seconds, default 300) and `APPLICATION_ROOT`
//! (URL prefix, default `/`).

mod errors;
mod loader;

pub use errors::ConfigError;
pub use loader::ConfigLoader;

use secrecy::SecretBox;
use std::time::Duration;

pub struct Config {
    pub connection_command: String,
    /// Informational; the connection command carries the login identity.
    pub pbx_username: String,
    pub pbx_password: SecretBox<String>,
    pub pbx_name: String,
    pub command_timeout: Duration,
    pub application_root: String,
}
