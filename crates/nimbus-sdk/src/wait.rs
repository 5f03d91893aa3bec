//! Wait handlers for asynchronous instance operations.
//!
//! Creating, updating and deleting an instance only schedules the work; the
//! handlers here poll the instance until it reaches a terminal state. The
//! credential handlers wait for the instance to be ready to issue a
//! credential, then fetch it.
//!
//! Every handler exists in an id-addressed and a name-addressed form, selected
//! through [`InstanceRef`]. All of them stop promptly when the cancellation
//! token fires.

use std::future::Future;
use std::time::Duration;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::client::EdgeApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{Instance, InstanceStatus, Kubeconfig, Token};

/// Errors returned while waiting.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The operation did not finish within the configured limit.
    #[error("operation did not reach a terminal state within {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// The wait was interrupted.
    #[error("wait was cancelled")]
    Cancelled,

    /// The instance reached a failure state.
    #[error("instance reached failure state {0}")]
    Failed(InstanceStatus),

    /// Polling failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Polling cadence and upper bound of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Pause between two polls.
    pub interval: Duration,
    /// Give up after this long.
    pub timeout: Duration,
}

impl WaitConfig {
    /// Create a config.
    #[must_use]
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Limits for provisioning, updating and deleting instances.
    #[must_use]
    pub const fn instance_lifecycle() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(45 * 60))
    }

    /// Limits for waiting until an instance can issue credentials.
    #[must_use]
    pub const fn credentials() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(10 * 60))
    }
}

/// How a handler addresses the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceRef {
    /// By opaque id.
    Id(String),
    /// By display name.
    Name(String),
}

impl InstanceRef {
    async fn get<C: EdgeApi>(
        &self,
        client: &C,
        project_id: &str,
        region: &str,
    ) -> ApiResult<Option<Instance>> {
        match self {
            Self::Id(id) => client.get_instance(project_id, region, id).await,
            Self::Name(name) => client.get_instance_by_name(project_id, region, name).await,
        }
    }
}

/// Drives an asynchronous operation to a terminal state.
pub trait Waiter<R> {
    /// Poll until the operation finishes, fails, times out, or `cancel` fires.
    fn await_terminal<'s>(
        &'s self,
        cancel: &'s CancellationToken,
    ) -> LocalBoxFuture<'s, Result<R, WaitError>>;
}

/// Repeatedly run `check` until it yields a value.
async fn poll<T, F, Fut>(
    config: WaitConfig,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, WaitError>>,
{
    let deadline = Instant::now() + config.timeout;
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        trace!(attempt, "Polling");
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(WaitError::Cancelled),
            outcome = check() => outcome?,
        };
        if let Some(done) = outcome {
            debug!(attempt, "Reached terminal state");
            return Ok(done);
        }
        if Instant::now() >= deadline {
            return Err(WaitError::Timeout(config.timeout));
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(WaitError::Cancelled),
            () = tokio::time::sleep(config.interval) => {}
        }
    }
}

/// Terminal check shared by the create, update and credential handlers.
fn ready(instance: Option<Instance>) -> Result<Option<Instance>, WaitError> {
    let Some(instance) = instance else {
        return Ok(None);
    };
    match instance.status {
        Some(InstanceStatus::Active) => Ok(Some(instance)),
        Some(InstanceStatus::Error) => Err(WaitError::Failed(InstanceStatus::Error)),
        status => {
            trace!(status = ?status, "Instance not ready yet");
            Ok(None)
        }
    }
}

// ============================================================================
// Instance lifecycle
// ============================================================================

/// Waits until a created or updated instance is active.
pub struct CreateOrUpdateWaiter<'a, C> {
    client: &'a C,
    project_id: String,
    region: String,
    target: InstanceRef,
    config: WaitConfig,
}

impl<'a, C: EdgeApi> CreateOrUpdateWaiter<'a, C> {
    /// Create a handler with the default limits.
    #[must_use]
    pub fn new(
        client: &'a C,
        project_id: impl Into<String>,
        region: impl Into<String>,
        target: InstanceRef,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            region: region.into(),
            target,
            config: WaitConfig::instance_lifecycle(),
        }
    }

    /// Override the polling limits.
    #[must_use]
    pub fn with_config(mut self, config: WaitConfig) -> Self {
        self.config = config;
        self
    }
}

impl<C: EdgeApi> Waiter<Instance> for CreateOrUpdateWaiter<'_, C> {
    fn await_terminal<'s>(
        &'s self,
        cancel: &'s CancellationToken,
    ) -> LocalBoxFuture<'s, Result<Instance, WaitError>> {
        async move {
            poll(self.config, cancel, || async {
                let instance = self
                    .target
                    .get(self.client, &self.project_id, &self.region)
                    .await?;
                ready(instance)
            })
            .await
        }
        .boxed_local()
    }
}

/// Waits until an instance is gone.
///
/// A 404 on the instance is the terminal success; for the name form this
/// covers the name disappearing mid-wait.
pub struct DeleteWaiter<'a, C> {
    client: &'a C,
    project_id: String,
    region: String,
    target: InstanceRef,
    config: WaitConfig,
}

impl<'a, C: EdgeApi> DeleteWaiter<'a, C> {
    /// Create a handler with the default limits.
    #[must_use]
    pub fn new(
        client: &'a C,
        project_id: impl Into<String>,
        region: impl Into<String>,
        target: InstanceRef,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            region: region.into(),
            target,
            config: WaitConfig::instance_lifecycle(),
        }
    }

    /// Override the polling limits.
    #[must_use]
    pub fn with_config(mut self, config: WaitConfig) -> Self {
        self.config = config;
        self
    }
}

impl<C: EdgeApi> Waiter<()> for DeleteWaiter<'_, C> {
    fn await_terminal<'s>(
        &'s self,
        cancel: &'s CancellationToken,
    ) -> LocalBoxFuture<'s, Result<(), WaitError>> {
        async move {
            poll(self.config, cancel, || async {
                match self
                    .target
                    .get(self.client, &self.project_id, &self.region)
                    .await
                {
                    Err(e) if e.is_not_found() => Ok(Some(())),
                    Err(e) => Err(e.into()),
                    Ok(Some(Instance {
                        status: Some(InstanceStatus::Error),
                        ..
                    })) => Err(WaitError::Failed(InstanceStatus::Error)),
                    Ok(_) => Ok(None),
                }
            })
            .await
        }
        .boxed_local()
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Waits for an instance to be active, then issues a kubeconfig.
pub struct KubeconfigWaiter<'a, C> {
    client: &'a C,
    project_id: String,
    region: String,
    target: InstanceRef,
    expiration_seconds: u64,
    config: WaitConfig,
}

impl<'a, C: EdgeApi> KubeconfigWaiter<'a, C> {
    /// Create a handler with the default limits.
    #[must_use]
    pub fn new(
        client: &'a C,
        project_id: impl Into<String>,
        region: impl Into<String>,
        target: InstanceRef,
        expiration_seconds: u64,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            region: region.into(),
            target,
            expiration_seconds,
            config: WaitConfig::credentials(),
        }
    }

    /// Override the polling limits.
    #[must_use]
    pub fn with_config(mut self, config: WaitConfig) -> Self {
        self.config = config;
        self
    }
}

impl<C: EdgeApi> Waiter<Kubeconfig> for KubeconfigWaiter<'_, C> {
    fn await_terminal<'s>(
        &'s self,
        cancel: &'s CancellationToken,
    ) -> LocalBoxFuture<'s, Result<Kubeconfig, WaitError>> {
        async move {
            poll(self.config, cancel, || async {
                let instance = self
                    .target
                    .get(self.client, &self.project_id, &self.region)
                    .await?;
                if ready(instance)?.is_none() {
                    return Ok(None);
                }
                let (p, r, exp) = (&self.project_id, &self.region, self.expiration_seconds);
                let kubeconfig = match &self.target {
                    InstanceRef::Id(id) => self.client.get_kubeconfig(p, r, id, exp).await?,
                    InstanceRef::Name(name) => {
                        self.client.get_kubeconfig_by_name(p, r, name, exp).await?
                    }
                };
                Ok(kubeconfig.filter(|k| k.kubeconfig.is_some()))
            })
            .await
        }
        .boxed_local()
    }
}

/// Waits for an instance to be active, then issues a token.
pub struct TokenWaiter<'a, C> {
    client: &'a C,
    project_id: String,
    region: String,
    target: InstanceRef,
    expiration_seconds: u64,
    config: WaitConfig,
}

impl<'a, C: EdgeApi> TokenWaiter<'a, C> {
    /// Create a handler with the default limits.
    #[must_use]
    pub fn new(
        client: &'a C,
        project_id: impl Into<String>,
        region: impl Into<String>,
        target: InstanceRef,
        expiration_seconds: u64,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            region: region.into(),
            target,
            expiration_seconds,
            config: WaitConfig::credentials(),
        }
    }

    /// Override the polling limits.
    #[must_use]
    pub fn with_config(mut self, config: WaitConfig) -> Self {
        self.config = config;
        self
    }
}

impl<C: EdgeApi> Waiter<Token> for TokenWaiter<'_, C> {
    fn await_terminal<'s>(
        &'s self,
        cancel: &'s CancellationToken,
    ) -> LocalBoxFuture<'s, Result<Token, WaitError>> {
        async move {
            poll(self.config, cancel, || async {
                let instance = self
                    .target
                    .get(self.client, &self.project_id, &self.region)
                    .await?;
                if ready(instance)?.is_none() {
                    return Ok(None);
                }
                let (p, r, exp) = (&self.project_id, &self.region, self.expiration_seconds);
                let token = match &self.target {
                    InstanceRef::Id(id) => self.client.get_token(p, r, id, exp).await?,
                    InstanceRef::Name(name) => {
                        self.client.get_token_by_name(p, r, name, exp).await?
                    }
                };
                Ok(token.filter(|t| t.token.is_some()))
            })
            .await
        }
        .boxed_local()
    }
}
