//! Running prepared requests.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use nimbus_sdk::{ApiError, WaitError};

use crate::error::CliError;
use crate::request::RequestSpec;

/// What a missing resource means to a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// HTTP 404 is a failure.
    #[default]
    Fail,
    /// HTTP 404 means the goal is already reached.
    Succeed,
}

/// Failures a prepared call can produce.
pub trait CallError: std::error::Error + Sized {
    /// The underlying API error, if the failure came from the API.
    fn api(&self) -> Option<&ApiError>;

    /// Convert into a command error for the call described by `what`.
    fn into_cli(self, executor: &Executor, what: &str) -> CliError;
}

impl CallError for ApiError {
    fn api(&self) -> Option<&ApiError> {
        Some(self)
    }

    fn into_cli(self, executor: &Executor, _what: &str) -> CliError {
        executor.classify(self)
    }
}

impl CallError for WaitError {
    fn api(&self) -> Option<&ApiError> {
        match self {
            WaitError::Api(e) => Some(e),
            _ => None,
        }
    }

    fn into_cli(self, executor: &Executor, what: &str) -> CliError {
        match self {
            WaitError::Cancelled => CliError::Cancelled,
            WaitError::Api(e) => executor.classify(e),
            source => CliError::Wait {
                operation: what.to_string(),
                source,
            },
        }
    }
}

/// Sends requests and classifies their failures.
#[derive(Debug, Clone)]
pub struct Executor {
    service: &'static str,
    cancel: CancellationToken,
    not_found: NotFoundPolicy,
}

impl Executor {
    /// An executor for calls to `service`, stopped by `cancel`.
    #[must_use]
    pub fn new(service: &'static str, cancel: CancellationToken) -> Self {
        Self {
            service,
            cancel,
            not_found: NotFoundPolicy::Fail,
        }
    }

    /// Change how HTTP 404 is treated.
    #[must_use]
    pub fn with_not_found(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found = policy;
        self
    }

    /// Run `spec`.
    ///
    /// Returns `None` only when the resource is missing and the policy is
    /// [`NotFoundPolicy::Succeed`].
    ///
    /// # Errors
    ///
    /// - [`CliError::Cancelled`] if the token fires first
    /// - [`CliError::ServiceDisabled`] if the service is off for the project
    /// - [`CliError::RequestFailed`] for other API and transport failures
    /// - [`CliError::EmptyResponse`] if a successful call returns nothing
    pub async fn execute<P, R, E: CallError>(
        &self,
        spec: RequestSpec<'_, P, R, E>,
        what: &str,
    ) -> Result<Option<R>, CliError> {
        debug!(
            what,
            project_id = %spec.project_id,
            region = %spec.region,
            "Sending request"
        );
        let call = (spec.execute)();
        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(CliError::Cancelled),
            result = call => result,
        };
        match result {
            Ok(Some(response)) => Ok(Some(response)),
            Ok(None) => Err(CliError::EmptyResponse(what.to_string())),
            Err(e)
                if self.not_found == NotFoundPolicy::Succeed
                    && e.api().is_some_and(ApiError::is_not_found) =>
            {
                debug!(what, "Resource already gone");
                Ok(None)
            }
            Err(e) => Err(e.into_cli(self, what)),
        }
    }

    /// Run `spec`, which must produce a response.
    ///
    /// # Errors
    ///
    /// As [`Executor::execute`], with [`CliError::EmptyResponse`] in place of
    /// a tolerated 404.
    pub async fn execute_required<P, R, E: CallError>(
        &self,
        spec: RequestSpec<'_, P, R, E>,
        what: &str,
    ) -> Result<R, CliError> {
        self.execute(spec, what)
            .await?
            .ok_or_else(|| CliError::EmptyResponse(what.to_string()))
    }

    fn classify(&self, err: ApiError) -> CliError {
        if err.is_service_disabled() {
            warn!(service = self.service, "Service not enabled");
            return CliError::ServiceDisabled {
                service: self.service.to_string(),
            };
        }
        CliError::RequestFailed(err)
    }
}
