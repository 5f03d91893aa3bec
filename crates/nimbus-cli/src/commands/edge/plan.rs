//! `edge plan list`.

use futures::FutureExt;
use serde::Serialize;

use nimbus_sdk::{EdgeApi, Plan, PlanList, ProjectApi};
use nimbus_validation::validate_limit;

use crate::cli::LimitArgs;
use crate::commands::Context;
use crate::error::CliError;
use crate::globals::{GlobalFlags, OutputFormat};
use crate::printer::Printer;
use crate::project::project_label;
use crate::request::RequestSpec;
use crate::table::Table;

use super::instance::list::truncate;

/// Parsed input of `edge plan list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputModel {
    /// Resolved global flags.
    pub global: GlobalFlags,
    /// Target project.
    pub project_id: String,
    /// Maximum number of plans to show.
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

/// Prepare the list call. Plans are per project, not per region.
pub fn build_request<'a, C: EdgeApi>(
    model: &'a InputModel,
    client: &'a C,
) -> RequestSpec<'a, (), PlanList> {
    RequestSpec::new(
        model.project_id.clone(),
        model.global.region.clone(),
        (),
        Box::new(move || async move { client.list_plans(&model.project_id).await }.boxed_local()),
    )
}

/// Render the plans as a table.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn output_result(
    printer: &Printer,
    format: OutputFormat,
    project_label: &str,
    plans: &[Plan],
) -> Result<(), CliError> {
    printer.output_result(format, plans, |p| {
        if plans.is_empty() {
            p.info(&format!("No plans found for project \"{project_label}\""));
            return Ok(());
        }
        let mut table = Table::new();
        table.set_header(&["ID", "NAME", "DESCRIPTION", "MAX EDGE HOSTS"]);
        for plan in plans {
            table.add_row([
                plan.id.clone().unwrap_or_default(),
                plan.name.clone().unwrap_or_default(),
                plan.description.clone().unwrap_or_default(),
                plan.max_edge_hosts.map(|n| n.to_string()).unwrap_or_default(),
            ]);
        }
        p.output_with(|w| table.render(w))
    })
}

/// Run `edge plan list`.
///
/// # Errors
///
/// Returns an error if any pipeline stage fails.
pub async fn run<C: EdgeApi + ProjectApi>(
    ctx: &Context<'_, C>,
    args: &LimitArgs,
) -> Result<(), CliError> {
    let model = parse_input(args, ctx.globals)?;
    ctx.printer.debug_input_model("edge plan list", &model);

    let spec = build_request(&model, ctx.client);
    let response = ctx.executor().execute_required(spec, "plan list").await?;
    let mut plans = response.valid_plans.unwrap_or_default();
    truncate(&mut plans, model.limit);

    let label = if plans.is_empty() {
        project_label(ctx.client, &model.project_id, ctx.cancel).await?
    } else {
        model.project_id.clone()
    };
    output_result(ctx.printer, model.global.output_format, &label, &plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_sdk::testing::{FakeEdgeApi, FakeResponse};

    use crate::commands::test_support::{Harness, PLAN, PROJECT, edge_calls};

    fn plan(name: &str, hosts: i64) -> Plan {
        Plan {
            id: Some(PLAN.into()),
            name: Some(name.into()),
            description: Some(format!("{name} plan")),
            max_edge_hosts: Some(hosts),
        }
    }

    #[tokio::test]
    async fn table_lists_plans() {
        let client = FakeEdgeApi::new().on_plans(FakeResponse::ok(PlanList {
            valid_plans: Some(vec![plan("small", 3), plan("large", 50)]),
        }));
        let harness = Harness::new(client, "");
        run(&harness.context(), &LimitArgs::default()).await.expect("listed");

        let out = harness.out.contents();
        assert!(out.starts_with("ID"));
        assert!(out.lines().next().is_some_and(|h| h.ends_with("MAX EDGE HOSTS")));
        assert!(out.contains("large plan"));
        assert_eq!(
            edge_calls(&harness.client)[0].path,
            format!("/v1beta1/projects/{PROJECT}/plans")
        );
    }

    #[tokio::test]
    async fn yaml_respects_the_limit() {
        let client = FakeEdgeApi::new().on_plans(FakeResponse::ok(PlanList {
            valid_plans: Some(vec![plan("small", 3), plan("large", 50)]),
        }));
        let harness = Harness::new(client, "").format(OutputFormat::Yaml);
        run(&harness.context(), &LimitArgs { limit: Some(1) })
            .await
            .expect("listed");

        let printed: Vec<Plan> = serde_yaml::from_str(&harness.out.contents()).expect("yaml");
        assert_eq!(printed, vec![plan("small", 3)]);
        assert!(harness.out.contents().contains("maxEdgeHosts: 3"));
    }

    #[tokio::test]
    async fn no_plans_is_reported() {
        let client = FakeEdgeApi::new().on_plans(FakeResponse::ok(PlanList::default()));
        let harness = Harness::new(client, "");
        run(&harness.context(), &LimitArgs::default()).await.expect("listed");
        assert_eq!(
            harness.err.contents(),
            format!("No plans found for project \"{PROJECT}\"\n")
        );
    }
}
