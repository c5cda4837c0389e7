use serde::Deserialize;
use std::{env, fs, path::PathBuf, time::Duration};

use super::{Config, ConfigError};
use crate::log_debug;

/// The original deployments ran long list commands; five minutes covers the
/// slowest of them.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// On-disk half of the configuration.
#[derive(Debug, Deserialize)]
struct FileConfig {
    connection_command: String,
    pbx_username: String,
    pbx_password: String,
}

pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// A CLI path wins over `PBXD_CONF`.
    pub fn new(cli_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = match cli_path {
            Some(path) => path,
            None => env::var_os("PBXD_CONF").map(PathBuf::from).ok_or(ConfigError::MissingPath)?,
        };
        Ok(Self { config_path })
    }

    pub fn load_config(self) -> Result<Config, ConfigError> {
        log_debug!("Loading pbxd config {:?}", self.config_path);

        let config_content = fs::read_to_string(&self.config_path)?;
        let file_config = parse_file_config(&config_content)?;

        let pbx_name = env::var("PBX_NAME").map_err(|_| ConfigError::MissingEnv("PBX_NAME"))?;
        let command_timeout = resolve_command_timeout(env::var("PBX_COMMAND_TIMEOUT").ok())?;
        let application_root = resolve_application_root(env::var("APPLICATION_ROOT").ok());

        Ok(Config {
            connection_command: file_config.connection_command,
            pbx_username: file_config.pbx_username,
            pbx_password: secrecy::SecretBox::new(Box::new(file_config.pbx_password)),
            pbx_name,
            command_timeout,
            application_root,
        })
    }
}

fn parse_file_config(content: &str) -> Result<FileConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

fn resolve_command_timeout(raw: Option<String>) -> Result<Duration, ConfigError> {
    match raw {
        Some(raw) => {
            let seconds: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout(raw))?;
            Ok(Duration::from_secs(seconds))
        }
        None => Ok(DEFAULT_COMMAND_TIMEOUT),
    }
}

fn resolve_application_root(raw: Option<String>) -> String {
    match raw {
        Some(root) if !root.trim().is_empty() => root,
        _ => "/".to_string(),
    }
}

#[cfg(test)]
#[path = "../test/config/loader.rs"]
mod tests;
