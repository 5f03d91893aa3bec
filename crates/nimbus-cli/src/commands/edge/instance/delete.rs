//! `edge instance delete`.

use futures::FutureExt;
use serde::Serialize;

use nimbus_sdk::{EdgeApi, ProjectApi};

use crate::commands::Context;
use crate::error::CliError;
use crate::globals::{GlobalFlags, OutputFormat};
use crate::identifier::{Identifier, IdentifierForm, InstanceSelector, require};
use crate::printer::Printer;
use crate::project::project_label;
use crate::request::{Execute, RequestSpec};
use crate::waiter::await_completion;

use super::delete_waiter;

/// Parsed input of `edge instance delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputModel {
    /// Resolved global flags.
    pub global: GlobalFlags,
    /// Target project.
    pub project_id: String,
    /// Instance to delete.
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

/// Prepare the delete call on the id or name path.
///
/// # Errors
///
/// Returns [`CliError::NoIdentifier`] without an identifier and
/// [`CliError::BuildRequest`] for an unknown identifier flag.
pub fn build_request<'a, C: EdgeApi>(
    model: &'a InputModel,
    client: &'a C,
) -> Result<RequestSpec<'a, (), ()>, CliError> {
    let identifier = require(model.identifier.as_ref())?;
    let form = identifier
        .form()
        .map_err(|e| CliError::build_request("select delete call", e))?;
    let (project_id, region, value) = (&model.project_id, &model.global.region, &identifier.value);

    let execute: Execute<'a, ()> = match form {
        IdentifierForm::Id => Box::new(move || {
            async move {
                client
                    .delete_instance(project_id, region, value)
                    .await
                    .map(Some)
            }
            .boxed_local()
        }),
        IdentifierForm::Name => Box::new(move || {
            async move {
                client
                    .delete_instance_by_name(project_id, region, value)
                    .await
                    .map(Some)
            }
            .boxed_local()
        }),
    };
    RequestSpec::new(project_id.clone(), region.clone(), (), execute).with_identifier(identifier)
}

/// Confirm the deletion.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn output_result(
    printer: &Printer,
    format: OutputFormat,
    async_mode: bool,
    project_label: &str,
    identifier: &Identifier,
) -> Result<(), CliError> {
    if format != OutputFormat::Pretty {
        return Ok(());
    }
    let operation = if async_mode {
        "Triggered deletion of"
    } else {
        "Deleted"
    };
    printer.outputln(&format!(
        "{operation} instance with \"{}\" \"{}\" of project \"{project_label}\".",
        identifier.flag, identifier.value
    ))
}

/// Run `edge instance delete`.
///
/// # Errors
///
/// Returns an error if any pipeline stage fails.
pub async fn run<C: EdgeApi + ProjectApi>(
    ctx: &Context<'_, C>,
    selector: &InstanceSelector,
) -> Result<(), CliError> {
    let model = parse_input(selector, ctx.globals)?;
    ctx.printer.debug_input_model("edge instance delete", &model);
    let identifier = require(model.identifier.as_ref())?;

    let label = project_label(ctx.client, &model.project_id, ctx.cancel).await?;
    if !model.global.assume_yes {
        ctx.printer
            .prompt_for_confirmation(
                &format!(
                    "Are you sure you want to delete the edge instance \"{}\" of project \"{label}\"?",
                    identifier.value
                ),
                ctx.cancel,
            )
            .await?;
    }

    let spec = build_request(&model, ctx.client)?;
    ctx.executor().execute_required(spec, "deletion result").await?;

    if !model.global.async_mode {
        let waiter = delete_waiter(
            &model.project_id,
            &model.global.region,
            identifier.instance_ref()?,
        )(ctx.client);
        await_completion(
            ctx.printer,
            waiter.as_ref(),
            ctx.cancel,
            "edge instance deletion",
            "Deleting instance",
        )
        .await?;
    }

    output_result(
        ctx.printer,
        model.global.output_format,
        model.global.async_mode,
        &label,
        identifier,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_sdk::testing::{FakeEdgeApi, FakeResponse};
    use nimbus_sdk::{Instance, InstanceStatus};

    use crate::commands::test_support::{Harness, PROJECT, edge_calls, globals};

    fn by_id(id: &str) -> InstanceSelector {
        InstanceSelector {
            instance_id: Some(id.into()),
            display_name: None,
        }
    }

    fn by_name(name: &str) -> InstanceSelector {
        InstanceSelector {
            instance_id: None,
            display_name: Some(name.into()),
        }
    }

    #[test]
    fn request_targets_the_id_path() {
        let model = parse_input(&by_id("edgesvc01"), &globals()).expect("valid");
        let client = FakeEdgeApi::new();
        let spec = build_request(&model, &client).expect("built");
        assert_eq!(spec.instance_id.as_deref(), Some("edgesvc01"));
        assert_eq!(spec.instance_name, None);
    }

    #[test]
    fn request_targets_the_name_path() {
        let model = parse_input(&by_name("edge01"), &globals()).expect("valid");
        let client = FakeEdgeApi::new();
        let spec = build_request(&model, &client).expect("built");
        assert_eq!(spec.instance_id, None);
        assert_eq!(spec.instance_name.as_deref(), Some("edge01"));
    }

    #[test]
    fn missing_identifier_fails_the_build() {
        let model = InputModel {
            global: globals(),
            project_id: PROJECT.into(),
            identifier: None,
        };
        let err = build_request(&model, &FakeEdgeApi::new()).expect_err("missing");
        assert!(matches!(err, CliError::NoIdentifier));
    }

    #[test]
    fn unknown_identifier_flag_fails_the_build() {
        let model = InputModel {
            global: globals(),
            project_id: PROJECT.into(),
            identifier: Some(Identifier::new("uuid", "abcd")),
        };
        let err = build_request(&model, &FakeEdgeApi::new()).expect_err("unknown");
        let CliError::BuildRequest { source, .. } = err else {
            unreachable!("expected BuildRequest, got {err:?}");
        };
        assert!(matches!(*source, CliError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn async_delete_by_id_skips_the_wait() {
        let client = FakeEdgeApi::new().on_delete(FakeResponse::empty());
        let harness = Harness::new(client, "").assume_yes().asynchronous();

        run(&harness.context(), &by_id("edgesvc01")).await.expect("deleted");

        let calls = edge_calls(&harness.client);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "DELETE");
        assert_eq!(
            calls[0].path,
            format!("/v1beta1/projects/{PROJECT}/regions/eu01/instances/edgesvc01")
        );
        assert!(harness.out.contents().starts_with("Triggered deletion of"));
        assert!(harness.err.contents().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_by_name_waits_until_gone() {
        let client = FakeEdgeApi::new().on_delete(FakeResponse::empty()).on_get(vec![
            FakeResponse::ok(Instance {
                status: Some(InstanceStatus::Deleting),
                ..Instance::default()
            }),
            FakeResponse::status(404, "not found"),
        ]);
        let harness = Harness::new(client, "yes\n");

        run(&harness.context(), &by_name("edge01")).await.expect("deleted");

        let calls = edge_calls(&harness.client);
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.path.ends_with("/instancesbyname/edge01")));
        assert_eq!(
            harness.out.contents(),
            format!("Deleted instance with \"display-name\" \"edge01\" of project \"{PROJECT}\".\n")
        );
    }

    #[tokio::test]
    async fn missing_instance_is_an_error() {
        let client = FakeEdgeApi::new().on_delete(FakeResponse::status(404, "not found"));
        let harness = Harness::new(client, "").assume_yes();
        let err = run(&harness.context(), &by_id("edgesvc01")).await.expect_err("404");
        assert!(matches!(err, CliError::RequestFailed(api) if api.is_not_found()));
    }

    #[tokio::test]
    async fn invalid_identifier_makes_no_call() {
        let harness = Harness::new(FakeEdgeApi::new(), "").assume_yes();
        let err = run(&harness.context(), &by_id("id")).await.expect_err("invalid");
        let message = err.to_string();
        assert!(message.contains("--instance-id"), "{message}");
        assert!(harness.client.calls().is_empty());
    }
}
