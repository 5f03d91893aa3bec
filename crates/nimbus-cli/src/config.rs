//! Persistent CLI configuration and environment lookup.
//!
//! The config file is `config.json` in `$NIMBUS_CONFIG_DIR`, or in
//! `nimbus/` under the platform config directory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use nimbus_sdk::ClientConfig;
use nimbus_sdk::client::{DEFAULT_EDGE_ENDPOINT, DEFAULT_RESOURCE_MANAGER_ENDPOINT};

use crate::error::CliError;
use crate::globals::OutputFormat;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "NIMBUS_CONFIG_DIR";

/// Environment variable holding the API access token.
pub const ACCESS_TOKEN_ENV: &str = "NIMBUS_ACCESS_TOKEN";

/// Environment variable overriding the edge-cloud endpoint.
pub const EDGE_ENDPOINT_ENV: &str = "NIMBUS_EDGE_ENDPOINT";

/// Environment variable overriding the resource-manager endpoint.
pub const RESOURCE_MANAGER_ENDPOINT_ENV: &str = "NIMBUS_RESOURCE_MANAGER_ENDPOINT";

const CONFIG_FILE_NAME: &str = "config.json";

/// Snapshot of the environment variables the CLI reads.
///
/// Empty values count as unset.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build an environment from explicit pairs.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Look up a variable.
    #[must_use]
    pub fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

/// Settings persisted by `nimbus config set`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Default project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Default region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Default output format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    /// Custom edge-cloud endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_endpoint: Option<String>,
    /// Custom resource-manager endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_manager_endpoint: Option<String>,
}

impl CliConfig {
    /// Load the config file. A missing file yields the default config.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CliError::Config(format!("read {}: {e}", path.display())));
            }
        };
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&raw)
            .map_err(|e| CliError::Config(format!("parse {}: {e}", path.display())))
    }

    /// Write the config file, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| CliError::Config(format!("create {}: {e}", dir.display())))?;
        }
        let mut raw = serde_json::to_string_pretty(self)
            .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
        raw.push('\n');
        fs::write(path, raw)
            .map_err(|e| CliError::Config(format!("write {}: {e}", path.display())))?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }
}

/// Location of the config file.
///
/// # Errors
///
/// Returns [`CliError::Config`] if no config directory can be determined.
pub fn config_path(env: &Environment) -> Result<PathBuf, CliError> {
    config_path_from(env, dirs::config_dir())
}

fn config_path_from(env: &Environment, platform_dir: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(dir) = env.var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir).join(CONFIG_FILE_NAME));
    }
    platform_dir
        .map(|d| d.join("nimbus").join(CONFIG_FILE_NAME))
        .ok_or_else(|| {
            CliError::Config(format!(
                "cannot determine the config directory, set {CONFIG_DIR_ENV}"
            ))
        })
}

/// Build the API client settings.
///
/// Endpoints come from the environment, then the config file, then the
/// built-in defaults. The access token must be in the environment.
///
/// # Errors
///
/// Returns [`CliError::Auth`] when no access token is set.
pub fn client_config(env: &Environment, config: &CliConfig) -> Result<ClientConfig, CliError> {
    let token = env.var(ACCESS_TOKEN_ENV).ok_or(CliError::Auth)?;
    let mut client = ClientConfig::new(token);
    client.edge_endpoint = env
        .var(EDGE_ENDPOINT_ENV)
        .or_else(|| config.edge_endpoint.clone())
        .unwrap_or_else(|| DEFAULT_EDGE_ENDPOINT.to_string());
    client.resource_manager_endpoint = env
        .var(RESOURCE_MANAGER_ENDPOINT_ENV)
        .or_else(|| config.resource_manager_endpoint.clone())
        .unwrap_or_else(|| DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string());
    client.user_agent = concat!("nimbus-cli/", env!("CARGO_PKG_VERSION")).to_string();
    Ok(client)
}
