//! `edge instance describe`.

use futures::FutureExt;
use serde::Serialize;

use nimbus_sdk::{EdgeApi, Instance};

use crate::commands::Context;
use crate::error::CliError;
use crate::globals::{GlobalFlags, OutputFormat};
use crate::identifier::{Identifier, IdentifierForm, InstanceSelector, require};
use crate::printer::Printer;
use crate::request::{Execute, RequestSpec};
use crate::table::Table;

/// Parsed input of `edge instance describe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputModel {
    /// Resolved global flags.
    pub global: GlobalFlags,
    /// Target project.
    pub project_id: String,
    /// Instance to show.
    pub identifier: Option<Identifier>,
}

/// Bind and validate the flags.
///
/// # Errors
///
/// Returns [`CliError::ProjectId`] without a project and
/// [`CliError::FlagValidation`] for an invalid identifier.
pub fn parse_input(
    selector: &InstanceSelector,
    globals: &GlobalFlags,
) -> Result<InputModel, CliError> {
    let project_id = globals.require_project_id()?.to_string();
    Ok(InputModel {
        global: globals.clone(),
        project_id,
        identifier: selector.validated_identifier()?,
    })
}

/// Prepare the get call on the id or name path.
///
/// # Errors
///
/// Returns [`CliError::NoIdentifier`] without an identifier and
/// [`CliError::BuildRequest`] for an unknown identifier flag.
pub fn build_request<'a, C: EdgeApi>(
    model: &'a InputModel,
    client: &'a C,
) -> Result<RequestSpec<'a, (), Instance>, CliError> {
    let identifier = require(model.identifier.as_ref())?;
    let form = identifier
        .form()
        .map_err(|e| CliError::build_request("select get call", e))?;
    let (project_id, region, value) = (&model.project_id, &model.global.region, &identifier.value);

    let execute: Execute<'a, Instance> = match form {
        IdentifierForm::Id => Box::new(move || {
            async move { client.get_instance(project_id, region, value).await }.boxed_local()
        }),
        IdentifierForm::Name => Box::new(move || {
            async move { client.get_instance_by_name(project_id, region, value).await }
                .boxed_local()
        }),
    };
    RequestSpec::new(project_id.clone(), region.clone(), (), execute).with_identifier(identifier)
}

fn cell<T: ToString>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Render the instance, one field per row.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn output_result(
    printer: &Printer,
    format: OutputFormat,
    instance: &Instance,
) -> Result<(), CliError> {
    printer.output_result(format, instance, |p| {
        let mut table = Table::new();
        let mut row = |key: &str, value: String| {
            table.add_row([key.to_string(), value]);
            table.add_separator();
        };
        row("CREATED", cell(instance.created.as_ref()));
        row("ID", cell(instance.id.as_ref()));
        row("NAME", cell(instance.display_name.as_ref()));
        if let Some(description) = &instance.description {
            row("DESCRIPTION", description.clone());
        }
        row("UI", cell(instance.frontend_url.as_ref()));
        row("STATE", cell(instance.status.as_ref()));
        row("PLAN", cell(instance.plan_id.as_ref()));
        p.output_with(|w| table.render(w))
    })
}

/// Run `edge instance describe`.
///
/// # Errors
///
/// Returns an error if any pipeline stage fails.
pub async fn run<C: EdgeApi>(
    ctx: &Context<'_, C>,
    selector: &InstanceSelector,
) -> Result<(), CliError> {
    let model = parse_input(selector, ctx.globals)?;
    ctx.printer.debug_input_model("edge instance describe", &model);

    let spec = build_request(&model, ctx.client)?;
    let instance = ctx.executor().execute_required(spec, "instance").await?;
    output_result(ctx.printer, model.global.output_format, &instance)
}
