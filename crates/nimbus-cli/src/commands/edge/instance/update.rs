//! `edge instance update`.

use futures::FutureExt;
use serde::Serialize;

use nimbus_sdk::{EdgeApi, ProjectApi, UpdateInstancePayload};
use nimbus_validation::{validate_description, validate_uuid};

use crate::cli::UpdateArgs;
use crate::commands::Context;
use crate::error::CliError;
use crate::globals::{GlobalFlags, OutputFormat};
use crate::identifier::{Identifier, IdentifierForm, require};
use crate::printer::Printer;
use crate::project::project_label;
use crate::request::{Execute, RequestSpec};
use crate::waiter::await_completion;

use super::create_or_update_waiter;

/// Parsed input of `edge instance update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputModel {
    /// Resolved global flags.
    pub global: GlobalFlags,
    /// Target project.
    pub project_id: String,
    /// Instance to update.
    pub identifier: Option<Identifier>,
    /// New description.
    pub description: Option<String>,
    /// New plan.
    pub plan_id: Option<String>,
}

/// Bind and validate the flags.
///
/// # Errors
///
/// Returns [`CliError::EmptyUpdate`] when neither field is given and
/// [`CliError::FlagValidation`] for an invalid value.
pub fn parse_input(args: &UpdateArgs, globals: &GlobalFlags) -> Result<InputModel, CliError> {
    let project_id = globals.require_project_id()?.to_string();
    let identifier = args.instance.validated_identifier()?;
    if args.description.is_none() && args.plan_id.is_none() {
        return Err(CliError::EmptyUpdate);
    }
    if let Some(description) = &args.description {
        validate_description(description).map_err(|e| CliError::flag(&e))?;
    }
    if let Some(plan_id) = &args.plan_id {
        validate_uuid("plan-id", plan_id).map_err(|e| CliError::flag(&e))?;
    }
    Ok(InputModel {
        global: globals.clone(),
        project_id,
        identifier,
        description: args.description.clone(),
        plan_id: args.plan_id.clone(),
    })
}

/// Prepare the update call on the id or name path.
///
/// # Errors
///
/// Returns [`CliError::NoIdentifier`] without an identifier and
/// [`CliError::BuildRequest`] for an unknown identifier flag.
pub fn build_request<'a, C: EdgeApi>(
    model: &'a InputModel,
    client: &'a C,
) -> Result<RequestSpec<'a, UpdateInstancePayload, ()>, CliError> {
    let identifier = require(model.identifier.as_ref())?;
    let form = identifier
        .form()
        .map_err(|e| CliError::build_request("select update call", e))?;
    let (project_id, region, value) = (&model.project_id, &model.global.region, &identifier.value);
    let payload = UpdateInstancePayload {
        description: model.description.clone(),
        plan_id: model.plan_id.clone(),
    };
    let body = payload.clone();

    let execute: Execute<'a, ()> = match form {
        IdentifierForm::Id => Box::new(move || {
            async move {
                client
                    .update_instance(project_id, region, value, &body)
                    .await
                    .map(Some)
            }
            .boxed_local()
        }),
        IdentifierForm::Name => Box::new(move || {
            async move {
                client
                    .update_instance_by_name(project_id, region, value, &body)
                    .await
                    .map(Some)
            }
            .boxed_local()
        }),
    };
    RequestSpec::new(project_id.clone(), region.clone(), payload, execute)
        .with_identifier(identifier)
}

/// Confirm the update.
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
        "Triggered update of"
    } else {
        "Updated"
    };
    printer.outputln(&format!(
        "{operation} instance with \"{}\" \"{}\" of project \"{project_label}\".",
        identifier.flag, identifier.value
    ))
}

/// Run `edge instance update`.
///
/// # Errors
///
/// Returns an error if any pipeline stage fails.
pub async fn run<C: EdgeApi + ProjectApi>(
    ctx: &Context<'_, C>,
    args: &UpdateArgs,
) -> Result<(), CliError> {
    let model = parse_input(args, ctx.globals)?;
    ctx.printer.debug_input_model("edge instance update", &model);
    let identifier = require(model.identifier.as_ref())?;

    let label = project_label(ctx.client, &model.project_id, ctx.cancel).await?;
    if !model.global.assume_yes {
        ctx.printer
            .prompt_for_confirmation(
                &format!(
                    "Are you sure you want to update the edge instance \"{}\" of project \"{label}\"?",
                    identifier.value
                ),
                ctx.cancel,
            )
            .await?;
    }

    let spec = build_request(&model, ctx.client)?;
    ctx.executor().execute_required(spec, "update result").await?;

    if !model.global.async_mode {
        let waiter = create_or_update_waiter(
            &model.project_id,
            &model.global.region,
            identifier.instance_ref()?,
        )(ctx.client);
        await_completion(
            ctx.printer,
            waiter.as_ref(),
            ctx.cancel,
            "edge instance update",
            "Updating instance",
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
    use nimbus_sdk::{Instance, InstanceStatus, WaitError};
    use serde_json::json;

    use crate::commands::test_support::{Harness, PLAN, PROJECT, edge_calls, globals};
    use crate::identifier::InstanceSelector;

    fn args(description: Option<&str>, plan_id: Option<&str>) -> UpdateArgs {
        UpdateArgs {
            instance: InstanceSelector {
                instance_id: Some("edgesvc01".into()),
                display_name: None,
            },
            description: description.map(Into::into),
            plan_id: plan_id.map(Into::into),
        }
    }

    #[test]
    fn nothing_to_change_is_rejected() {
        let err = parse_input(&args(None, None), &globals()).expect_err("empty");
        assert!(matches!(err, CliError::EmptyUpdate));
    }

    #[test]
    fn empty_description_is_a_change() {
        let model = parse_input(&args(Some(""), None), &globals()).expect("valid");
        assert_eq!(model.description.as_deref(), Some(""));
        assert_eq!(model.plan_id, None);
    }

    #[tokio::test]
    async fn payload_carries_only_given_fields() {
        let model = parse_input(&args(None, Some(PLAN)), &globals()).expect("valid");
        let client = FakeEdgeApi::new().on_update(FakeResponse::empty());
        let spec = build_request(&model, &client).expect("built");
        assert_eq!(spec.instance_id.as_deref(), Some("edgesvc01"));

        (spec.execute)().await.expect("call");
        let call = &client.calls()[0];
        assert_eq!(call.method, "PUT");
        assert_eq!(
            call.path,
            format!("/v1beta1/projects/{PROJECT}/regions/eu01/instances/edgesvc01")
        );
        assert_eq!(call.body, Some(json!({ "planId": PLAN })));
    }

    #[tokio::test(start_paused = true)]
    async fn update_waits_for_reconciliation() {
        let client = FakeEdgeApi::new().on_update(FakeResponse::empty()).on_get(vec![
            FakeResponse::ok(Instance {
                status: Some(InstanceStatus::Reconciling),
                ..Instance::default()
            }),
            FakeResponse::ok(Instance {
                status: Some(InstanceStatus::Active),
                ..Instance::default()
            }),
        ]);
        let harness = Harness::new(client, "").assume_yes();

        run(&harness.context(), &args(Some("new"), None)).await.expect("updated");

        assert_eq!(edge_calls(&harness.client).len(), 3);
        assert_eq!(
            harness.out.contents(),
            format!("Updated instance with \"instance-id\" \"edgesvc01\" of project \"{PROJECT}\".\n")
        );
    }

    #[tokio::test]
    async fn failure_state_ends_the_wait() {
        let client = FakeEdgeApi::new().on_update(FakeResponse::empty()).on_get(vec![
            FakeResponse::ok(Instance {
                status: Some(InstanceStatus::Error),
                ..Instance::default()
            }),
        ]);
        let harness = Harness::new(client, "").assume_yes();
        let err = run(&harness.context(), &args(Some("new"), None))
            .await
            .expect_err("failed");
        assert!(matches!(
            err,
            CliError::Wait { source: WaitError::Failed(InstanceStatus::Error), .. }
        ));
        assert!(harness.out.contents().is_empty());
    }
}
