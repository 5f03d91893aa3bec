//! Persistent CLI configuration commands.

use std::path::PathBuf;

use tracing::info;

use nimbus_validation::validate_uuid;

use crate::cli::{ConfigCommands, ConfigKey, ConfigSetArgs};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::globals::{GlobalArgs, OutputFormat, PROJECT_ID_FLAG};
use crate::printer::Printer;
use crate::table::Table;

/// Config command executor.
pub struct ConfigCommand<'a> {
    path: PathBuf,
    printer: &'a Printer,
}

impl<'a> ConfigCommand<'a> {
    /// A command operating on the config file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, printer: &'a Printer) -> Self {
        Self {
            path: path.into(),
            printer,
        }
    }

    /// Execute a config subcommand.
    ///
    /// `config set` takes its values from the global flags as typed, without
    /// environment or config fallbacks.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be read, validated or written.
    pub fn execute(
        &self,
        command: &ConfigCommands,
        globals: &GlobalArgs,
        format: OutputFormat,
    ) -> Result<(), CliError> {
        match command {
            ConfigCommands::Set(args) => self.set(globals, args),
            ConfigCommands::Unset { keys } => self.unset(keys),
            ConfigCommands::List => self.list(format),
        }
    }

    fn set(&self, globals: &GlobalArgs, args: &ConfigSetArgs) -> Result<(), CliError> {
        let mut config = CliConfig::load(&self.path)?;
        let mut changed = false;

        if let Some(project_id) = &globals.project_id {
            validate_uuid(PROJECT_ID_FLAG, project_id).map_err(|e| CliError::flag(&e))?;
            config.project_id = Some(project_id.clone());
            changed = true;
        }
        if let Some(region) = &globals.region {
            config.region = Some(region.clone());
            changed = true;
        }
        if let Some(format) = globals.output_format {
            config.output_format = Some(format);
            changed = true;
        }
        for (value, slot, flag) in [
            (&args.edge_endpoint, &mut config.edge_endpoint, "edge-endpoint"),
            (
                &args.resource_manager_endpoint,
                &mut config.resource_manager_endpoint,
                "resource-manager-endpoint",
            ),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(CliError::invalid_flag(flag, "must not be empty"));
                }
                *slot = Some(value.clone());
                changed = true;
            }
        }

        if !changed {
            return Err(CliError::EmptyUpdate);
        }
        self.save(&config)
    }

    fn unset(&self, keys: &[ConfigKey]) -> Result<(), CliError> {
        let mut config = CliConfig::load(&self.path)?;
        for key in keys {
            match key {
                ConfigKey::ProjectId => config.project_id = None,
                ConfigKey::Region => config.region = None,
                ConfigKey::OutputFormat => config.output_format = None,
                ConfigKey::EdgeEndpoint => config.edge_endpoint = None,
                ConfigKey::ResourceManagerEndpoint => config.resource_manager_endpoint = None,
            }
        }
        self.save(&config)
    }

    fn list(&self, format: OutputFormat) -> Result<(), CliError> {
        let config = CliConfig::load(&self.path)?;
        self.printer.output_result(format, &config, |p| {
            let rows = [
                ("PROJECT ID", config.project_id.clone()),
                ("REGION", config.region.clone()),
                (
                    "OUTPUT FORMAT",
                    config.output_format.map(|f| f.as_str().to_string()),
                ),
                ("EDGE ENDPOINT", config.edge_endpoint.clone()),
                (
                    "RESOURCE MANAGER ENDPOINT",
                    config.resource_manager_endpoint.clone(),
                ),
            ];
            let mut table = Table::new();
            table.set_header(&["NAME", "VALUE"]);
            let mut empty = true;
            for (name, value) in rows {
                if let Some(value) = value {
                    table.add_row([name.to_string(), value]);
                    empty = false;
                }
            }
            if empty {
                p.info("No settings configured");
                return Ok(());
            }
            p.output_with(|w| table.render(w))
        })
    }

    fn save(&self, config: &CliConfig) -> Result<(), CliError> {
        config.save(&self.path)?;
        info!(path = %self.path.display(), "Updated config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::SharedBuffer;

    const PROJECT: &str = "5a8f0d3e-1c2b-4a5d-9e6f-7a8b9c0d1e2f";

    struct Fixture {
        _dir: tempfile::TempDir,
        path: PathBuf,
        out: SharedBuffer,
        err: SharedBuffer,
        printer: Printer,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let printer = Printer::buffered(&out, &err, "");
        Fixture {
            _dir: dir,
            path,
            out,
            err,
            printer,
        }
    }

    fn globals(project_id: Option<&str>, region: Option<&str>) -> GlobalArgs {
        GlobalArgs {
            project_id: project_id.map(Into::into),
            region: region.map(Into::into),
            ..GlobalArgs::default()
        }
    }

    #[test]
    fn set_then_unset() {
        let f = fixture();
        let command = ConfigCommand::new(&f.path, &f.printer);
        command
            .execute(
                &ConfigCommands::Set(ConfigSetArgs {
                    edge_endpoint: Some("https://edge.test".into()),
                    ..ConfigSetArgs::default()
                }),
                &globals(Some(PROJECT), Some("eu02")),
                OutputFormat::Pretty,
            )
            .expect("set");

        let config = CliConfig::load(&f.path).expect("load");
        assert_eq!(config.project_id.as_deref(), Some(PROJECT));
        assert_eq!(config.region.as_deref(), Some("eu02"));
        assert_eq!(config.edge_endpoint.as_deref(), Some("https://edge.test"));

        command
            .execute(
                &ConfigCommands::Unset {
                    keys: vec![ConfigKey::Region, ConfigKey::EdgeEndpoint],
                },
                &GlobalArgs::default(),
                OutputFormat::Pretty,
            )
            .expect("unset");
        let config = CliConfig::load(&f.path).expect("load");
        assert_eq!(config.project_id.as_deref(), Some(PROJECT));
        assert_eq!(config.region, None);
        assert_eq!(config.edge_endpoint, None);
    }

    #[test]
    fn set_validates_the_project() {
        let f = fixture();
        let err = ConfigCommand::new(&f.path, &f.printer)
            .execute(
                &ConfigCommands::Set(ConfigSetArgs::default()),
                &globals(Some("not-a-uuid"), None),
                OutputFormat::Pretty,
            )
            .expect_err("invalid");
        assert!(matches!(err, CliError::FlagValidation { flag, .. } if flag == "project-id"));
        assert!(!f.path.exists());
    }

    #[test]
    fn set_without_values_is_rejected() {
        let f = fixture();
        let err = ConfigCommand::new(&f.path, &f.printer)
            .execute(
                &ConfigCommands::Set(ConfigSetArgs::default()),
                &GlobalArgs::default(),
                OutputFormat::Pretty,
            )
            .expect_err("empty");
        assert!(matches!(err, CliError::EmptyUpdate));
    }

    #[test]
    fn list_renders_in_the_selected_format() {
        let f = fixture();
        let command = ConfigCommand::new(&f.path, &f.printer);
        command
            .execute(
                &ConfigCommands::List,
                &GlobalArgs::default(),
                OutputFormat::Pretty,
            )
            .expect("list");
        assert_eq!(f.err.contents(), "No settings configured\n");

        CliConfig {
            region: Some("eu02".into()),
            ..CliConfig::default()
        }
        .save(&f.path)
        .expect("save");
        command
            .execute(&ConfigCommands::List, &GlobalArgs::default(), OutputFormat::Json)
            .expect("list");
        let printed: serde_json::Value = serde_json::from_str(&f.out.contents()).expect("json");
        assert_eq!(printed, serde_json::json!({ "region": "eu02" }));
    }
}
