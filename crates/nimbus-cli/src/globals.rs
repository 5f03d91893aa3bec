//! Flags accepted by every command.
//!
//! [`GlobalArgs`] is what clap parses; [`GlobalFlags`] is the resolved view
//! after environment variables and the config file have been applied.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use nimbus_validation::validate_uuid;

use crate::config::{CliConfig, Environment};
use crate::error::CliError;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "eu01";

/// Name of the project-id flag.
pub const PROJECT_ID_FLAG: &str = "project-id";

/// Environment variable holding the project id.
pub const PROJECT_ID_ENV: &str = "NIMBUS_PROJECT_ID";

/// Environment variable holding the region.
pub const REGION_ENV: &str = "NIMBUS_REGION";

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and messages.
    #[default]
    Pretty,
    /// JSON for scripting.
    Json,
    /// YAML for scripting.
    Yaml,
    /// No output.
    None,
}

impl OutputFormat {
    /// The flag value naming this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::None => "none",
        }
    }
}

/// How much diagnostic output to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warning,
    /// Informational messages.
    #[default]
    Info,
    /// Everything, including the parsed input of each command.
    Debug,
}

impl Verbosity {
    /// Log filter used when `RUST_LOG` is not set.
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warn",
            Self::Info => "warn,nimbus=info,nimbus_cli=info,nimbus_sdk=info,nimbus_kubeconfig=info",
            Self::Debug => "debug",
        }
    }
}

/// Global flags as parsed from the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Project to operate on (UUID). Falls back to NIMBUS_PROJECT_ID and the config file.
    #[arg(long, global = true, value_name = "UUID")]
    pub project_id: Option<String>,

    /// Region to operate in. Falls back to NIMBUS_REGION, the config file and "eu01".
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Output format.
    #[arg(short = 'o', long, global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Diagnostic output level.
    #[arg(long, global = true, value_enum, default_value_t = Verbosity::Info)]
    pub verbosity: Verbosity,

    /// Answer yes to every confirmation prompt.
    #[arg(short = 'y', long, global = true)]
    pub assume_yes: bool,

    /// Do not wait for asynchronous operations to finish.
    #[arg(long = "async", global = true)]
    pub async_mode: bool,
}

/// Global settings after applying the environment and the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalFlags {
    /// Selected project, if any.
    pub project_id: Option<String>,
    /// Selected region.
    pub region: String,
    /// Selected output format.
    pub output_format: OutputFormat,
    /// Diagnostic level.
    pub verbosity: Verbosity,
    /// Skip confirmation prompts.
    pub assume_yes: bool,
    /// Do not wait for completion.
    #[serde(rename = "async")]
    pub async_mode: bool,
}

impl Default for GlobalFlags {
    fn default() -> Self {
        Self {
            project_id: None,
            region: DEFAULT_REGION.to_string(),
            output_format: OutputFormat::Pretty,
            verbosity: Verbosity::Info,
            assume_yes: false,
            async_mode: false,
        }
    }
}

impl GlobalFlags {
    /// Resolve each setting as flag, then environment, then config file, then
    /// default.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::FlagValidation`] if the resolved project id is not
    /// a UUID.
    pub fn resolve(
        args: &GlobalArgs,
        env: &Environment,
        config: &CliConfig,
    ) -> Result<Self, CliError> {
        let project_id = args
            .project_id
            .clone()
            .or_else(|| env.var(PROJECT_ID_ENV))
            .or_else(|| config.project_id.clone());
        if let Some(id) = &project_id {
            validate_uuid(PROJECT_ID_FLAG, id).map_err(|e| CliError::flag(&e))?;
        }

        let region = args
            .region
            .clone()
            .or_else(|| env.var(REGION_ENV))
            .or_else(|| config.region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Self {
            project_id,
            region,
            output_format: args
                .output_format
                .or(config.output_format)
                .unwrap_or_default(),
            verbosity: args.verbosity,
            assume_yes: args.assume_yes,
            async_mode: args.async_mode,
        })
    }

    /// The project id, required by every edge command.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::ProjectId`] when no project is selected.
    pub fn require_project_id(&self) -> Result<&str, CliError> {
        self.project_id.as_deref().ok_or(CliError::ProjectId)
    }
}
