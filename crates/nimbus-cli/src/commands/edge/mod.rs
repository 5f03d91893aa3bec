//! Edge-cloud commands.
//!
//! - [`instance`] - create, delete, describe, list and update instances
//! - [`plan`] - list plans
//! - [`token`] - issue instance API tokens
//! - [`kubeconfig`] - issue kubeconfigs and install them locally

pub mod instance;
pub mod kubeconfig;
pub mod plan;
pub mod token;

use nimbus_sdk::{EdgeApi, InstanceRef, ProjectApi};
use nimbus_validation::duration::DurationParser;
use nimbus_validation::{EXPIRATION_SECONDS_DEFAULT, validate_expiration};

use crate::cli::{EdgeCommands, KubeconfigCommands, PlanCommands, TokenCommands};
use crate::commands::Context;
use crate::error::CliError;
use crate::identifier::{Identifier, IdentifierForm};

pub use instance::InstanceCommand;

const EXPIRATION_FLAG: &str = "expiration";

/// Edge command executor.
pub struct EdgeCommand<'a, C> {
    ctx: Context<'a, C>,
}

impl<'a, C: EdgeApi + ProjectApi> EdgeCommand<'a, C> {
    /// Create a new edge command.
    #[must_use]
    pub fn new(ctx: Context<'a, C>) -> Self {
        Self { ctx }
    }

    /// Execute an edge subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if input validation, the API call, the wait or
    /// rendering fails.
    pub async fn execute(&self, command: &EdgeCommands) -> Result<(), CliError> {
        match command {
            EdgeCommands::Instance { command } => {
                InstanceCommand::new(&self.ctx).execute(command).await
            }
            EdgeCommands::Plan {
                command: PlanCommands::List(args),
            } => plan::run(&self.ctx, args).await,
            EdgeCommands::Token {
                command: TokenCommands::Create(args),
            } => token::run(&self.ctx, args).await,
            EdgeCommands::Kubeconfig {
                command: KubeconfigCommands::Create(args),
            } => kubeconfig::run(&self.ctx, args).await,
        }
    }
}

/// Credential lifetime in seconds, one hour when not given.
///
/// # Errors
///
/// Returns [`CliError::FlagValidation`] for a malformed duration or one
/// outside the accepted lifetimes.
pub(crate) fn parse_expiration(value: Option<&str>) -> Result<u64, CliError> {
    let Some(value) = value else {
        return Ok(EXPIRATION_SECONDS_DEFAULT);
    };
    let seconds = DurationParser::new()
        .parse(value)
        .map_err(|e| CliError::invalid_flag(EXPIRATION_FLAG, e))?;
    validate_expiration(seconds).map_err(|e| CliError::invalid_flag(EXPIRATION_FLAG, e.reason()))
}

/// The wait-handler target for `identifier`, failing as a request build error.
pub(crate) fn credential_target(identifier: &Identifier) -> Result<InstanceRef, CliError> {
    match identifier.form() {
        Ok(IdentifierForm::Id) => Ok(InstanceRef::Id(identifier.value.clone())),
        Ok(IdentifierForm::Name) => Ok(InstanceRef::Name(identifier.value.clone())),
        Err(e) => Err(CliError::build_request("select credential call", e)),
    }
}

/// Reject `--async` for commands that must wait for their result.
pub(crate) fn reject_async(async_mode: bool) -> Result<(), CliError> {
    if async_mode {
        return Err(CliError::invalid_flag(
            "async",
            "is not supported by this command",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn expiration_defaults_to_one_hour() {
        assert_eq!(parse_expiration(None).expect("default"), 3600);
    }

    #[test_case("10m", 600 ; "lower bound")]
    #[test_case("180d", 15_552_000 ; "upper bound")]
    #[test_case("12h", 43_200 ; "hours")]
    fn expiration_converts_to_seconds(value: &str, seconds: u64) {
        assert_eq!(parse_expiration(Some(value)).expect("valid"), seconds);
    }

    #[test_case("9m" ; "below minimum")]
    #[test_case("181d" ; "above maximum")]
    #[test_case("1h30m" ; "mixed units")]
    #[test_case("1.5h" ; "float")]
    #[test_case("60" ; "missing unit")]
    fn bad_expirations_name_the_flag(value: &str) {
        assert!(matches!(
            parse_expiration(Some(value)),
            Err(CliError::FlagValidation { flag, .. }) if flag == "expiration"
        ));
    }

    #[test]
    fn async_is_rejected() {
        assert!(reject_async(false).is_ok());
        assert!(matches!(
            reject_async(true),
            Err(CliError::FlagValidation { flag, .. }) if flag == "async"
        ));
    }
}
