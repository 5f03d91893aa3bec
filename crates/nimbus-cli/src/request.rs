//! Prepared API calls.

use std::fmt;

use futures::future::LocalBoxFuture;

use nimbus_sdk::ApiError;

use crate::error::CliError;
use crate::identifier::{Identifier, IdentifierForm};

/// The deferred API call of a [`RequestSpec`].
///
/// Plain calls fail with [`ApiError`]; calls that wait for readiness before
/// fetching fail with `nimbus_sdk::WaitError`.
pub type Execute<'a, R, E = ApiError> =
    Box<dyn FnOnce() -> LocalBoxFuture<'a, Result<Option<R>, E>> + 'a>;

/// A request ready to be sent.
///
/// The target fields echo what the call will address so tests can check a
/// built request without running it. `execute` performs the call.
pub struct RequestSpec<'a, P, R, E = ApiError> {
    /// Project the call targets.
    pub project_id: String,
    /// Region the call targets.
    pub region: String,
    /// Instance id, when addressed by id.
    pub instance_id: Option<String>,
    /// Instance display name, when addressed by name.
    pub instance_name: Option<String>,
    /// Credential lifetime in seconds, for credential calls.
    pub expiration: Option<u64>,
    /// Request body, `()` for calls without one.
    pub payload: P,
    /// The call itself.
    pub execute: Execute<'a, R, E>,
}

impl<P: fmt::Debug, R, E> fmt::Debug for RequestSpec<'_, P, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("project_id", &self.project_id)
            .field("region", &self.region)
            .field("instance_id", &self.instance_id)
            .field("instance_name", &self.instance_name)
            .field("expiration", &self.expiration)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

impl<'a, P, R, E> RequestSpec<'a, P, R, E> {
    /// A request against a project and region.
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        payload: P,
        execute: Execute<'a, R, E>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            instance_id: None,
            instance_name: None,
            expiration: None,
            payload,
            execute,
        }
    }

    /// Record which instance the call addresses.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::BuildRequest`] if the identifier flag is unknown.
    pub fn with_identifier(mut self, identifier: &Identifier) -> Result<Self, CliError> {
        match identifier
            .form()
            .map_err(|e| CliError::build_request("invalid identifier flag", e))?
        {
            IdentifierForm::Id => self.instance_id = Some(identifier.value.clone()),
            IdentifierForm::Name => self.instance_name = Some(identifier.value.clone()),
        }
        Ok(self)
    }

    /// Record the credential lifetime.
    #[must_use]
    pub fn with_expiration(mut self, seconds: u64) -> Self {
        self.expiration = Some(seconds);
        self
    }
}
