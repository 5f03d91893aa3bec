//! `edge kubeconfig create`.
//!
//! The issued kubeconfig is merged into the local kubeconfig file, replaces
//! it with `--overwrite`, or is printed with `--disable-writing`.

use std::path::PathBuf;

use futures::FutureExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use nimbus_kubeconfig::{WriteOptions, write_kubeconfig};
use nimbus_sdk::wait::KubeconfigWaiter;
use nimbus_sdk::{EdgeApi, Kubeconfig, WaitError, Waiter};

use crate::cli::KubeconfigArgs;
use crate::commands::Context;
use crate::error::CliError;
use crate::globals::{GlobalFlags, OutputFormat};
use crate::identifier::{Identifier, require};
use crate::printer::Printer;
use crate::request::RequestSpec;

use super::{credential_target, parse_expiration, reject_async};

/// Parsed input of `edge kubeconfig create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputModel {
    /// Resolved global flags.
    pub global: GlobalFlags,
    /// Target project.
    pub project_id: String,
    /// Instance to issue the kubeconfig for.
    pub identifier: Option<Identifier>,
    /// Kubeconfig lifetime in seconds.
    pub expiration: u64,
    /// File to write, the default location when unset.
    pub filepath: Option<PathBuf>,
    /// Print instead of writing.
    pub disable_writing: bool,
    /// Replace the file instead of merging.
    pub overwrite: bool,
    /// Make the new context current.
    pub switch_context: bool,
}

/// Bind and validate the flags.
///
/// # Errors
///
/// Returns [`CliError::FlagValidation`] for an invalid identifier or
/// expiration, for `--async`, and for `--disable-writing` without a JSON or
/// YAML output format.
pub fn parse_input(args: &KubeconfigArgs, globals: &GlobalFlags) -> Result<InputModel, CliError> {
    let project_id = globals.require_project_id()?.to_string();
    let identifier = args.credential.instance.validated_identifier()?;
    let expiration = parse_expiration(args.credential.expiration.as_deref())?;
    reject_async(globals.async_mode)?;

    if args.disable_writing {
        match globals.output_format {
            OutputFormat::Json | OutputFormat::Yaml => {}
            OutputFormat::Pretty => {
                return Err(CliError::invalid_flag(
                    "disable-writing",
                    "must be used with --output-format",
                ));
            }
            OutputFormat::None => {
                return Err(CliError::invalid_flag(
                    "output-format",
                    "valid output formats for this command are: json, yaml",
                ));
            }
        }
    }

    Ok(InputModel {
        global: globals.clone(),
        project_id,
        identifier,
        expiration,
        filepath: args.filepath.clone(),
        disable_writing: args.disable_writing,
        overwrite: args.overwrite,
        switch_context: args.switch_context,
    })
}

/// Prepare the kubeconfig call. It waits for the instance to be ready, then
/// issues the kubeconfig.
///
/// # Errors
///
/// Returns [`CliError::NoIdentifier`] without an identifier and
/// [`CliError::BuildRequest`] for an unknown identifier flag.
pub fn build_request<'a, C: EdgeApi>(
    model: &'a InputModel,
    client: &'a C,
    cancel: &'a CancellationToken,
) -> Result<RequestSpec<'a, (), Kubeconfig, WaitError>, CliError> {
    let identifier = require(model.identifier.as_ref())?;
    let target = credential_target(identifier)?;
    let spec = RequestSpec::new(
        model.project_id.clone(),
        model.global.region.clone(),
        (),
        Box::new(move || {
            async move {
                let waiter = KubeconfigWaiter::new(
                    client,
                    model.project_id.as_str(),
                    model.global.region.as_str(),
                    target,
                    model.expiration,
                );
                waiter.await_terminal(cancel).await.map(Some)
            }
            .boxed_local()
        }),
    );
    Ok(spec.with_identifier(identifier)?.with_expiration(model.expiration))
}

/// Serialize the issued document: explicit JSON or YAML wins, otherwise
/// YAML for files and JSON for the terminal.
fn serialize(model: &InputModel, kubeconfig: &Kubeconfig) -> Result<String, CliError> {
    let document = kubeconfig
        .kubeconfig
        .as_ref()
        .ok_or_else(|| CliError::EmptyResponse("kubeconfig".to_string()))?;
    let as_json = match model.global.output_format {
        OutputFormat::Json => true,
        OutputFormat::Yaml => false,
        OutputFormat::Pretty | OutputFormat::None => model.disable_writing,
    };
    if as_json {
        serde_json::to_string_pretty(document)
            .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))
    } else {
        serde_yaml::to_string(document)
            .map_err(|e| CliError::Format(format!("YAML serialization failed: {e}")))
    }
}

/// Write or print the issued kubeconfig.
///
/// # Errors
///
/// Returns [`CliError::Kubeconfig`] if writing fails or is declined and an
/// error if rendering fails.
pub fn output_result(
    printer: &Printer,
    model: &InputModel,
    kubeconfig: &Kubeconfig,
) -> Result<(), CliError> {
    let data = serialize(model, kubeconfig)?;
    if model.disable_writing {
        return printer.outputln(data.trim_end());
    }

    let mut options = WriteOptions::new()
        .with_overwrite(model.overwrite)
        .with_switch_context(model.switch_context);
    if !model.global.assume_yes {
        options = options.with_confirmation(|message| printer.confirm(message));
    }
    let path = write_kubeconfig(model.filepath.as_deref(), &data, &options)?;

    if model.global.output_format == OutputFormat::Pretty {
        let value = model.identifier.as_ref().map_or("", |i| i.value.as_str());
        printer.outputln(&format!(
            "Wrote kubeconfig for instance \"{value}\" to \"{}\".",
            path.display()
        ))?;
        if model.switch_context {
            printer.outputln("Switched context as requested.")?;
        }
    }
    Ok(())
}

/// Run `edge kubeconfig create`.
///
/// # Errors
///
/// Returns an error if any pipeline stage fails.
pub async fn run<C: EdgeApi>(ctx: &Context<'_, C>, args: &KubeconfigArgs) -> Result<(), CliError> {
    let model = parse_input(args, ctx.globals)?;
    ctx.printer.debug_input_model("edge kubeconfig create", &model);

    let spec = build_request(&model, ctx.client, ctx.cancel)?;
    let spinner = ctx.printer.spinner("Waiting for the instance to issue a kubeconfig");
    let kubeconfig = ctx.executor().execute_required(spec, "kubeconfig").await;
    spinner.finish_and_clear();
    output_result(ctx.printer, &model, &kubeconfig?)
}
