//! CLI error types.

use std::io;

use nimbus_kubeconfig::KubeconfigError;
use nimbus_sdk::{ApiError, WaitError};
use nimbus_validation::ValidationError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// No project was selected.
    #[error(
        "project ID is not set\n\
         select a project with the --project-id flag, \
         persist one with `nimbus config set --project-id <uuid>`, \
         or export NIMBUS_PROJECT_ID"
    )]
    ProjectId,

    /// A flag value violates a constraint.
    #[error("the provided flag --{flag} is invalid: {details}")]
    FlagValidation {
        /// Flag name without dashes.
        flag: String,
        /// What is wrong with the value.
        details: String,
    },

    /// A positional argument is invalid.
    #[error("the provided argument \"{arg}\" is invalid: {details}")]
    ArgValidation {
        /// The offending argument.
        arg: String,
        /// What is wrong with it.
        details: String,
    },

    /// Neither an instance id nor a display name was given.
    #[error("no instance identifier provided: use --instance-id or --display-name")]
    NoIdentifier,

    /// The identifier flag is not one this command understands.
    #[error("invalid identifier flag {0:?}: expected instance-id or display-name")]
    InvalidIdentifier(String),

    /// The request could not be assembled.
    #[error("build request: {message}: {source}")]
    BuildRequest {
        /// What was being built.
        message: String,
        /// Underlying cause.
        #[source]
        source: Box<CliError>,
    },

    /// The API call failed.
    #[error("request failed: {0}")]
    RequestFailed(#[source] ApiError),

    /// An update was requested without any field to change.
    #[error("please specify at least one field to update")]
    EmptyUpdate,

    /// Writing the kubeconfig failed.
    #[error(transparent)]
    Kubeconfig(#[from] KubeconfigError),

    /// The service is not enabled for the project.
    #[error(
        "the {service} service is not enabled for this project\n\
         enable it for the project and try again"
    )]
    ServiceDisabled {
        /// Service name.
        service: String,
    },

    /// A successful call returned no body.
    #[error("empty response from API: no {0} returned")]
    EmptyResponse(String),

    /// Waiting for an asynchronous operation failed.
    #[error("wait for {operation}: {source}")]
    Wait {
        /// The awaited operation.
        operation: String,
        /// Why the wait ended.
        #[source]
        source: WaitError,
    },

    /// The operator interrupted the command.
    #[error("operation cancelled")]
    Cancelled,

    /// The operator declined a confirmation prompt.
    #[error("operation aborted")]
    Aborted,

    /// No access token is configured.
    #[error("no access token configured\nexport NIMBUS_ACCESS_TOKEN with a valid service account token")]
    Auth,

    /// The configuration is unreadable or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),
}

impl CliError {
    /// Report a validator failure against the flag it validated.
    #[must_use]
    pub fn flag(err: &ValidationError) -> Self {
        Self::FlagValidation {
            flag: err.field.clone(),
            details: err.reason(),
        }
    }

    /// Report an invalid value of `flag`.
    #[must_use]
    pub fn invalid_flag(flag: impl Into<String>, details: impl ToString) -> Self {
        Self::FlagValidation {
            flag: flag.into(),
            details: details.to_string(),
        }
    }

    /// Wrap `source` as a request assembly failure.
    #[must_use]
    pub fn build_request(message: impl Into<String>, source: Self) -> Self {
        Self::BuildRequest {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_validation_names_the_flag() {
        let err = CliError::flag(&ValidationError::too_short("instance-id", 4, 2));
        assert_eq!(
            err.to_string(),
            "the provided flag --instance-id is invalid: is too short (minimum length is 4 characters)"
        );
    }

    #[test]
    fn arg_validation_quotes_the_argument() {
        let err = CliError::ArgValidation {
            arg: "abc".into(),
            details: "not a UUID".into(),
        };
        assert_eq!(
            err.to_string(),
            "the provided argument \"abc\" is invalid: not a UUID"
        );
    }

    #[test]
    fn project_id_names_all_remedies() {
        let message = CliError::ProjectId.to_string();
        assert!(message.contains("--project-id"));
        assert!(message.contains("nimbus config set --project-id"));
        assert!(message.contains("NIMBUS_PROJECT_ID"));
    }

    #[test]
    fn request_failed_keeps_api_error_as_source() {
        let err = CliError::RequestFailed(ApiError::http(500, "boom"));
        let source = std::error::Error::source(&err).expect("source");
        let api = source.downcast_ref::<ApiError>().expect("api error");
        assert_eq!(api.status_code(), Some(500));
    }

    #[test]
    fn build_request_wraps_cause() {
        let err = CliError::build_request(
            "invalid identifier flag",
            CliError::InvalidIdentifier("uuid".into()),
        );
        assert!(err.to_string().contains("\"uuid\""));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        assert!(matches!(CliError::from(io_err), CliError::Io(_)));
    }
}
