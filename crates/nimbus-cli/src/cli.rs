//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::globals::GlobalArgs;
use crate::identifier::InstanceSelector;

/// Nimbus CLI - manage edge-cloud instances and their credentials.
#[derive(Parser, Debug, Clone)]
#[command(name = "nimbus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Flags shared by every command.
    #[command(flatten)]
    pub globals: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Edge-cloud service commands.
    Edge {
        /// Edge subcommand to execute.
        #[command(subcommand)]
        command: EdgeCommands,
    },

    /// Manage the persistent CLI configuration.
    Config {
        /// Config subcommand to execute.
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Edge-cloud resources.
#[derive(Subcommand, Debug, Clone)]
pub enum EdgeCommands {
    /// Manage edge instances.
    Instance {
        /// Instance subcommand to execute.
        #[command(subcommand)]
        command: InstanceCommands,
    },

    /// Inspect edge plans.
    Plan {
        /// Plan subcommand to execute.
        #[command(subcommand)]
        command: PlanCommands,
    },

    /// Issue instance API tokens.
    Token {
        /// Token subcommand to execute.
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Issue and install instance kubeconfigs.
    Kubeconfig {
        /// Kubeconfig subcommand to execute.
        #[command(subcommand)]
        command: KubeconfigCommands,
    },
}

/// Instance subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum InstanceCommands {
    /// Create an edge instance.
    Create(CreateArgs),

    /// Delete an edge instance.
    Delete(InstanceSelector),

    /// Show the details of an edge instance.
    Describe(InstanceSelector),

    /// List the edge instances of a project.
    List(LimitArgs),

    /// Change the description or plan of an edge instance.
    Update(UpdateArgs),
}

/// Arguments for `edge instance create`.
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Display name of the new instance.
    #[arg(short = 'n', long)]
    pub display_name: String,

    /// Plan to create the instance on (UUID).
    #[arg(long, value_name = "UUID")]
    pub plan_id: String,

    /// Free-text description.
    #[arg(short = 'd', long)]
    pub description: Option<String>,
}

/// Arguments for `edge instance update`.
#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Instance to update.
    #[command(flatten)]
    pub instance: InstanceSelector,

    /// New description.
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// New plan (UUID).
    #[arg(long, value_name = "UUID")]
    pub plan_id: Option<String>,
}

/// A result limit for list commands.
#[derive(Args, Debug, Clone, Default)]
pub struct LimitArgs {
    /// Maximum number of entries to list.
    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i64>,
}

/// Plan subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum PlanCommands {
    /// List the plans available to a project.
    List(LimitArgs),
}

/// Token subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum TokenCommands {
    /// Issue a token for an instance's API.
    ///
    /// Waits until the instance is ready before issuing the token.
    Create(CredentialArgs),
}

/// Instance and lifetime of a credential.
#[derive(Args, Debug, Clone)]
pub struct CredentialArgs {
    /// Instance to issue the credential for.
    #[command(flatten)]
    pub instance: InstanceSelector,

    /// Credential lifetime, e.g. 30m, 12h, 7d or 1M. Defaults to one hour.
    #[arg(short = 'e', long)]
    pub expiration: Option<String>,
}

/// Kubeconfig subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum KubeconfigCommands {
    /// Issue a kubeconfig and merge it into the local kubeconfig file.
    ///
    /// Waits until the instance is ready before issuing the kubeconfig.
    Create(KubeconfigArgs),
}

/// Arguments for `edge kubeconfig create`.
#[derive(Args, Debug, Clone)]
pub struct KubeconfigArgs {
    /// Instance and lifetime of the kubeconfig.
    #[command(flatten)]
    pub credential: CredentialArgs,

    /// Kubeconfig file to write. Defaults to $KUBECONFIG or ~/.kube/config.
    #[arg(short = 'f', long, conflicts_with = "disable_writing")]
    pub filepath: Option<PathBuf>,

    /// Print the kubeconfig instead of writing it.
    #[arg(long)]
    pub disable_writing: bool,

    /// Replace the kubeconfig file instead of merging into it.
    #[arg(long, conflicts_with = "disable_writing")]
    pub overwrite: bool,

    /// Make the new context the current one.
    #[arg(long)]
    pub switch_context: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Persist settings. Takes the global --project-id, --region and
    /// --output-format flags plus the endpoint flags below.
    Set(ConfigSetArgs),

    /// Remove persisted settings.
    Unset {
        /// Settings to remove.
        #[arg(required = true, value_enum)]
        keys: Vec<ConfigKey>,
    },

    /// Show the persisted settings.
    List,
}

/// Settings only `config set` accepts.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSetArgs {
    /// Custom edge-cloud API endpoint.
    #[arg(long, value_name = "URL")]
    pub edge_endpoint: Option<String>,

    /// Custom resource-manager API endpoint.
    #[arg(long, value_name = "URL")]
    pub resource_manager_endpoint: Option<String>,
}

/// A persisted setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Default project.
    ProjectId,
    /// Default region.
    Region,
    /// Default output format.
    OutputFormat,
    /// Edge-cloud endpoint.
    EdgeEndpoint,
    /// Resource-manager endpoint.
    ResourceManagerEndpoint,
}
