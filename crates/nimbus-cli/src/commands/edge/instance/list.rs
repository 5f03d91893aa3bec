//! `edge instance list`.

use futures::FutureExt;
use serde::Serialize;

use nimbus_sdk::{EdgeApi, Instance, InstanceList, ProjectApi};
use nimbus_validation::validate_limit;

use crate::cli::LimitArgs;
use crate::commands::Context;
use crate::error::CliError;
use crate::globals::{GlobalFlags, OutputFormat};
use crate::printer::Printer;
use crate::project::project_label;
use crate::request::RequestSpec;
use crate::table::Table;

/// Parsed input of `edge instance list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputModel {
    /// Resolved global flags.
    pub global: GlobalFlags,
    /// Target project.
    pub project_id: String,
    /// Maximum number of instances to show.
    pub limit: Option<u64>,
}

/// Bind and validate the flags.
///
/// # Errors
///
/// Returns [`CliError::ProjectId`] without a project and
/// [`CliError::FlagValidation`] for a limit below 1.
pub fn parse_input(args: &LimitArgs, globals: &GlobalFlags) -> Result<InputModel, CliError> {
    let project_id = globals.require_project_id()?.to_string();
    let limit = args
        .limit
        .map(validate_limit)
        .transpose()
        .map_err(|e| CliError::flag(&e))?;
    Ok(InputModel {
        global: globals.clone(),
        project_id,
        limit,
    })
}

/// Prepare the list call.
pub fn build_request<'a, C: EdgeApi>(
    model: &'a InputModel,
    client: &'a C,
) -> RequestSpec<'a, (), InstanceList> {
    RequestSpec::new(
        model.project_id.clone(),
        model.global.region.clone(),
        (),
        Box::new(move || {
            async move {
                client
                    .list_instances(&model.project_id, &model.global.region)
                    .await
            }
            .boxed_local()
        }),
    )
}

/// Keep at most `limit` entries.
pub(crate) fn truncate<T>(items: &mut Vec<T>, limit: Option<u64>) {
    if let Some(limit) = limit {
        items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
}

/// Render the instances as a table.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn output_result(
    printer: &Printer,
    format: OutputFormat,
    project_label: &str,
    instances: &[Instance],
) -> Result<(), CliError> {
    printer.output_result(format, instances, |p| {
        if instances.is_empty() {
            p.info(&format!("No instances found for project \"{project_label}\""));
            return Ok(());
        }
        let mut table = Table::new();
        table.set_header(&["ID", "NAME", "UI", "STATE"]);
        for instance in instances {
            table.add_row([
                instance.id.clone().unwrap_or_default(),
                instance.display_name.clone().unwrap_or_default(),
                instance.frontend_url.clone().unwrap_or_default(),
                instance.status.map(|s| s.to_string()).unwrap_or_default(),
            ]);
        }
        p.output_with(|w| table.render(w))
    })
}

/// Run `edge instance list`.
///
/// # Errors
///
/// Returns an error if any pipeline stage fails.
pub async fn run<C: EdgeApi + ProjectApi>(
    ctx: &Context<'_, C>,
    args: &LimitArgs,
) -> Result<(), CliError> {
    let model = parse_input(args, ctx.globals)?;
    ctx.printer.debug_input_model("edge instance list", &model);

    let spec = build_request(&model, ctx.client);
    let response = ctx.executor().execute_required(spec, "instance list").await?;
    let mut instances = response.instances.unwrap_or_default();
    truncate(&mut instances, model.limit);

    let label = if instances.is_empty() {
        project_label(ctx.client, &model.project_id, ctx.cancel).await?
    } else {
        model.project_id.clone()
    };
    output_result(ctx.printer, model.global.output_format, &label, &instances)
}
