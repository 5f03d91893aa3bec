//! `edge instance create`.

use futures::FutureExt;
use serde::Serialize;

use nimbus_sdk::{CreateInstancePayload, EdgeApi, Instance, InstanceRef, ProjectApi};
use nimbus_validation::{validate_description, validate_display_name, validate_uuid};

use crate::cli::CreateArgs;
use crate::commands::Context;
use crate::error::CliError;
use crate::globals::{GlobalFlags, OutputFormat};
use crate::printer::Printer;
use crate::project::project_label;
use crate::request::RequestSpec;
use crate::waiter::await_completion;

use super::create_or_update_waiter;

const PLAN_ID_FLAG: &str = "plan-id";

/// Parsed input of `edge instance create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputModel {
    /// Resolved global flags.
    pub global: GlobalFlags,
    /// Target project.
    pub project_id: String,
    /// Display name of the new instance.
    pub display_name: String,
    /// Plan to create the instance on.
    pub plan_id: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Bind and validate the flags.
///
/// # Errors
///
/// Returns [`CliError::ProjectId`] without a project and
/// [`CliError::FlagValidation`] for an invalid value.
pub fn parse_input(args: &CreateArgs, globals: &GlobalFlags) -> Result<InputModel, CliError> {
    let project_id = globals.require_project_id()?.to_string();
    validate_display_name(&args.display_name).map_err(|e| CliError::flag(&e))?;
    validate_uuid(PLAN_ID_FLAG, &args.plan_id).map_err(|e| CliError::flag(&e))?;
    if let Some(description) = &args.description {
        validate_description(description).map_err(|e| CliError::flag(&e))?;
    }
    Ok(InputModel {
        global: globals.clone(),
        project_id,
        display_name: args.display_name.clone(),
        plan_id: args.plan_id.clone(),
        description: args.description.clone(),
    })
}

/// Prepare the create call.
pub fn build_request<'a, C: EdgeApi>(
    model: &'a InputModel,
    client: &'a C,
) -> RequestSpec<'a, CreateInstancePayload, Instance> {
    let payload = CreateInstancePayload {
        display_name: model.display_name.clone(),
        plan_id: model.plan_id.clone(),
        description: model.description.clone(),
    };
    let body = payload.clone();
    RequestSpec::new(
        model.project_id.clone(),
        model.global.region.clone(),
        payload,
        Box::new(move || {
            async move {
                client
                    .create_instance(&model.project_id, &model.global.region, &body)
                    .await
            }
            .boxed_local()
        }),
    )
}

/// Render the created instance.
///
/// # Errors
///
/// Returns an error if rendering fails.
pub fn output_result(
    printer: &Printer,
    format: OutputFormat,
    async_mode: bool,
    project_label: &str,
    instance: &Instance,
) -> Result<(), CliError> {
    printer.output_result(format, instance, |p| {
        let operation = if async_mode {
            "Triggered creation of"
        } else {
            "Created"
        };
        p.outputln(&format!(
            "{operation} instance for project \"{project_label}\". Instance ID: \"{}\".",
            instance.id.as_deref().unwrap_or_default()
        ))
    })
}

/// Run `edge instance create`.
///
/// # Errors
///
/// Returns an error if any pipeline stage fails.
pub async fn run<C: EdgeApi + ProjectApi>(
    ctx: &Context<'_, C>,
    args: &CreateArgs,
) -> Result<(), CliError> {
    let model = parse_input(args, ctx.globals)?;
    ctx.printer.debug_input_model("edge instance create", &model);

    let label = project_label(ctx.client, &model.project_id, ctx.cancel).await?;
    if !model.global.assume_yes {
        ctx.printer
            .prompt_for_confirmation(
                &format!(
                    "Are you sure you want to create a new edge instance for project \"{label}\"?"
                ),
                ctx.cancel,
            )
            .await?;
    }

    let spec = build_request(&model, ctx.client);
    let instance = ctx.executor().execute_required(spec, "instance").await?;
    let instance_id = instance
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CliError::EmptyResponse("instance id".to_string()))?;

    if !model.global.async_mode {
        let waiter = create_or_update_waiter(
            &model.project_id,
            &model.global.region,
            InstanceRef::Id(instance_id),
        )(ctx.client);
        await_completion(
            ctx.printer,
            waiter.as_ref(),
            ctx.cancel,
            "edge instance creation",
            "Creating instance",
        )
        .await?;
    }

    output_result(
        ctx.printer,
        model.global.output_format,
        model.global.async_mode,
        &label,
        &instance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_sdk::testing::{FakeEdgeApi, FakeResponse};
    use nimbus_sdk::{InstanceStatus, Project};
    use serde_json::json;

    use crate::commands::test_support::{
        Harness, PLAN, PROJECT, edge_calls, globals, pending_input,
    };

    fn args() -> CreateArgs {
        CreateArgs {
            display_name: "edge01".into(),
            plan_id: PLAN.into(),
            description: None,
        }
    }

    fn created(status: InstanceStatus) -> Instance {
        Instance {
            id: Some("edgesvc01".into()),
            display_name: Some("edge01".into()),
            status: Some(status),
            ..Instance::default()
        }
    }

    #[test]
    fn valid_input_is_kept_verbatim() {
        let model = parse_input(
            &CreateArgs {
                description: Some(String::new()),
                ..args()
            },
            &globals(),
        )
        .expect("valid");
        assert_eq!(model.project_id, PROJECT);
        assert_eq!(model.display_name, "edge01");
        assert_eq!(model.plan_id, PLAN);
        assert_eq!(model.description.as_deref(), Some(""));
    }

    #[test]
    fn project_is_required() {
        let err = parse_input(&args(), &GlobalFlags::default()).expect_err("no project");
        assert!(matches!(err, CliError::ProjectId));
    }

    #[test]
    fn invalid_plan_names_its_flag() {
        let err = parse_input(
            &CreateArgs {
                plan_id: "plan".into(),
                ..args()
            },
            &globals(),
        )
        .expect_err("invalid");
        assert!(matches!(err, CliError::FlagValidation { flag, .. } if flag == "plan-id"));
    }

    #[test]
    fn long_description_is_rejected() {
        let err = parse_input(
            &CreateArgs {
                description: Some("x".repeat(257)),
                ..args()
            },
            &globals(),
        )
        .expect_err("too long");
        assert!(matches!(err, CliError::FlagValidation { flag, .. } if flag == "description"));
    }

    #[tokio::test]
    async fn request_omits_unset_description() {
        let model = parse_input(&args(), &globals()).expect("valid");
        let client = FakeEdgeApi::new().on_create(FakeResponse::ok(created(InstanceStatus::Creating)));
        let spec = build_request(&model, &client);
        assert_eq!(spec.project_id, PROJECT);
        assert_eq!(spec.region, "eu01");
        assert_eq!(spec.instance_id, None);

        (spec.execute)().await.expect("call");
        let calls = client.calls();
        assert_eq!(calls[0].method, "POST");
        assert_eq!(
            calls[0].body,
            Some(json!({ "displayName": "edge01", "planId": PLAN }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn create_waits_and_reports_the_new_id() {
        let client = FakeEdgeApi::new()
            .on_project(FakeResponse::ok(Project {
                project_id: Some(PROJECT.into()),
                name: Some("Edge Team".into()),
            }))
            .on_create(FakeResponse::ok(created(InstanceStatus::Creating)))
            .on_get(vec![
                FakeResponse::ok(created(InstanceStatus::Creating)),
                FakeResponse::ok(created(InstanceStatus::Active)),
            ]);
        let harness = Harness::new(client, "y\n");

        run(&harness.context(), &args()).await.expect("created");

        let calls = edge_calls(&harness.client);
        assert_eq!(calls.iter().filter(|c| c.method == "POST").count(), 1);
        assert_eq!(calls.iter().filter(|c| c.method == "GET").count(), 2);
        assert!(calls[1].path.ends_with("/instances/edgesvc01"));
        assert_eq!(
            harness.out.contents(),
            "Created instance for project \"Edge Team\". Instance ID: \"edgesvc01\".\n"
        );
        assert!(harness.err.contents().contains(
            "Are you sure you want to create a new edge instance for project \"Edge Team\"? [y/N] "
        ));
    }

    #[tokio::test]
    async fn declining_sends_nothing() {
        let harness = Harness::new(FakeEdgeApi::new(), "n\n");
        let err = run(&harness.context(), &args()).await.expect_err("declined");
        assert!(matches!(err, CliError::Aborted));
        assert!(edge_calls(&harness.client).is_empty());
    }

    #[tokio::test]
    async fn interrupt_during_the_prompt_sends_nothing() {
        let (release, pending) = pending_input();
        let mut harness = Harness::new(FakeEdgeApi::new(), "");
        harness.printer = harness.printer.with_input(pending);

        let interrupt = harness.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            interrupt.cancel();
        });
        let err = run(&harness.context(), &args()).await.expect_err("interrupted");

        assert!(matches!(err, CliError::Cancelled));
        assert!(harness.err.contents().ends_with("[y/N] "));
        assert!(edge_calls(&harness.client).is_empty());
        drop(release);
    }

    #[tokio::test]
    async fn response_without_id_is_empty() {
        let client = FakeEdgeApi::new().on_create(FakeResponse::ok(Instance::default()));
        let harness = Harness::new(client, "").assume_yes().asynchronous();
        let err = run(&harness.context(), &args()).await.expect_err("no id");
        assert!(matches!(err, CliError::EmptyResponse(what) if what == "instance id"));
    }

    #[tokio::test]
    async fn json_output_is_the_response() {
        let client =
            FakeEdgeApi::new().on_create(FakeResponse::ok(created(InstanceStatus::Creating)));
        let harness = Harness::new(client, "")
            .assume_yes()
            .asynchronous()
            .format(OutputFormat::Json);
        run(&harness.context(), &args()).await.expect("created");

        let printed: serde_json::Value =
            serde_json::from_str(&harness.out.contents()).expect("json");
        assert_eq!(printed["id"], "edgesvc01");
        assert_eq!(printed["status"], "CREATING");
        assert_eq!(edge_calls(&harness.client).len(), 1);
    }
}
