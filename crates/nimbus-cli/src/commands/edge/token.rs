//! `edge token create`.

use futures::FutureExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use nimbus_sdk::wait::TokenWaiter;
use nimbus_sdk::{EdgeApi, Token, WaitError, Waiter};

use crate::cli::CredentialArgs;
use crate::commands::Context;
use crate::error::CliError;
use crate::globals::{GlobalFlags, OutputFormat};
use crate::identifier::{Identifier, require};
use crate::printer::Printer;
use crate::request::RequestSpec;

use super::{credential_target, parse_expiration, reject_async};

/// Parsed input of `edge token create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputModel {
    /// Resolved global flags.
    pub global: GlobalFlags,
    /// Target project.
    pub project_id: String,
    /// Instance to issue the token for.
    pub identifier: Option<Identifier>,
    /// Token lifetime in seconds.
    pub expiration: u64,
}

/// Bind and validate the flags.
///
/// # Errors
///
/// Returns [`CliError::FlagValidation`] for an invalid identifier or
/// expiration, for `--async` and for `--output-format none`.
pub fn parse_input(args: &CredentialArgs, globals: &GlobalFlags) -> Result<InputModel, CliError> {
    let project_id = globals.require_project_id()?.to_string();
    let identifier = args.instance.validated_identifier()?;
    let expiration = parse_expiration(args.expiration.as_deref())?;
    reject_async(globals.async_mode)?;
    if globals.output_format == OutputFormat::None {
        return Err(CliError::invalid_flag(
            "output-format",
            "valid formats for this command are: pretty, json, yaml",
        ));
    }
    Ok(InputModel {
        global: globals.clone(),
        project_id,
        identifier,
        expiration,
    })
}

/// Prepare the token call. It waits for the instance to be ready, then
/// issues the token.
///
/// # Errors
///
/// Returns [`CliError::NoIdentifier`] without an identifier and
/// [`CliError::BuildRequest`] for an unknown identifier flag.
pub fn build_request<'a, C: EdgeApi>(
    model: &'a InputModel,
    client: &'a C,
    cancel: &'a CancellationToken,
) -> Result<RequestSpec<'a, (), Token, WaitError>, CliError> {
    let identifier = require(model.identifier.as_ref())?;
    let target = credential_target(identifier)?;
    let spec = RequestSpec::new(
        model.project_id.clone(),
        model.global.region.clone(),
        (),
        Box::new(move || {
            async move {
                let waiter = TokenWaiter::new(
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

/// Print the token.
///
/// # Errors
///
/// Returns [`CliError::EmptyResponse`] without a token and an error if
/// rendering fails.
pub fn output_result(printer: &Printer, format: OutputFormat, token: &Token) -> Result<(), CliError> {
    let value = token
        .token
        .as_deref()
        .ok_or_else(|| CliError::EmptyResponse("token".to_string()))?;
    printer.output_result(format, token, |p| p.outputln(value))
}

/// Run `edge token create`.
///
/// # Errors
///
/// Returns an error if any pipeline stage fails.
pub async fn run<C: EdgeApi>(ctx: &Context<'_, C>, args: &CredentialArgs) -> Result<(), CliError> {
    let model = parse_input(args, ctx.globals)?;
    ctx.printer.debug_input_model("edge token create", &model);

    let spec = build_request(&model, ctx.client, ctx.cancel)?;
    let spinner = ctx.printer.spinner("Waiting for the instance to issue a token");
    let token = ctx.executor().execute_required(spec, "token").await;
    spinner.finish_and_clear();
    output_result(ctx.printer, model.global.output_format, &token?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_sdk::testing::{FakeEdgeApi, FakeResponse};
    use nimbus_sdk::{Instance, InstanceStatus};

    use crate::commands::test_support::{Harness, PROJECT, edge_calls, globals};
    use crate::identifier::InstanceSelector;

    fn args(expiration: Option<&str>) -> CredentialArgs {
        CredentialArgs {
            instance: InstanceSelector {
                instance_id: None,
                display_name: Some("edge01".into()),
            },
            expiration: expiration.map(Into::into),
        }
    }

    fn active() -> FakeResponse<Instance> {
        FakeResponse::ok(Instance {
            status: Some(InstanceStatus::Active),
            ..Instance::default()
        })
    }

    #[test]
    fn none_output_is_rejected() {
        let globals = GlobalFlags {
            output_format: OutputFormat::None,
            ..globals()
        };
        let err = parse_input(&args(None), &globals).expect_err("none");
        assert!(matches!(err, CliError::FlagValidation { flag, .. } if flag == "output-format"));
    }

    #[test]
    fn request_echoes_target_and_lifetime() {
        let model = parse_input(&args(Some("2h")), &globals()).expect("valid");
        let client = FakeEdgeApi::new();
        let cancel = CancellationToken::new();
        let spec = build_request(&model, &client, &cancel).expect("built");
        assert_eq!(spec.instance_name.as_deref(), Some("edge01"));
        assert_eq!(spec.expiration, Some(7200));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn token_is_printed_after_readiness() {
        let client = FakeEdgeApi::new()
            .on_get(vec![active()])
            .on_token(FakeResponse::ok(Token {
                token: Some("secret-token".into()),
            }));
        let harness = Harness::new(client, "");
        run(&harness.context(), &args(None)).await.expect("issued");

        assert_eq!(harness.out.contents(), "secret-token\n");
        let calls = edge_calls(&harness.client);
        assert_eq!(
            calls[1].path,
            format!(
                "/v1beta1/projects/{PROJECT}/regions/eu01/instancesbyname/edge01/token?expirationSeconds=3600"
            )
        );
    }

    #[tokio::test]
    async fn cancellation_stops_the_wait() {
        let client = FakeEdgeApi::new().on_get(vec![FakeResponse::ok(Instance {
            status: Some(InstanceStatus::Creating),
            ..Instance::default()
        })]);
        let harness = Harness::new(client, "");
        harness.cancel.cancel();
        let err = run(&harness.context(), &args(None)).await.expect_err("cancelled");
        assert!(matches!(err, CliError::Cancelled));
    }
}
