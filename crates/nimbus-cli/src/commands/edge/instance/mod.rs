//! Edge instance commands.
//!
//! Delete, describe and update address the instance by id or by display
//! name; the chosen form selects both the API path and the wait handler.

pub mod create;
pub mod delete;
pub mod describe;
pub mod list;
pub mod update;

use nimbus_sdk::wait::{CreateOrUpdateWaiter, DeleteWaiter};
use nimbus_sdk::{EdgeApi, Instance, InstanceRef, ProjectApi};

use crate::cli::InstanceCommands;
use crate::commands::Context;
use crate::error::CliError;
use crate::waiter::WaiterFactory;

/// Instance command executor.
pub struct InstanceCommand<'c, 'a, C> {
    ctx: &'c Context<'a, C>,
}

impl<'c, 'a, C: EdgeApi + ProjectApi> InstanceCommand<'c, 'a, C> {
    /// Create a new instance command.
    #[must_use]
    pub fn new(ctx: &'c Context<'a, C>) -> Self {
        Self { ctx }
    }

    /// Execute an instance subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    pub async fn execute(&self, command: &InstanceCommands) -> Result<(), CliError> {
        match command {
            InstanceCommands::Create(args) => create::run(self.ctx, args).await,
            InstanceCommands::Delete(selector) => delete::run(self.ctx, selector).await,
            InstanceCommands::Describe(selector) => describe::run(self.ctx, selector).await,
            InstanceCommands::List(args) => list::run(self.ctx, args).await,
            InstanceCommands::Update(args) => update::run(self.ctx, args).await,
        }
    }
}

/// Waits until a created or updated instance is active.
pub fn create_or_update_waiter<'a, C: EdgeApi + 'a>(
    project_id: &str,
    region: &str,
    target: InstanceRef,
) -> WaiterFactory<'a, C, Instance> {
    let (project_id, region) = (project_id.to_string(), region.to_string());
    Box::new(move |client| {
        Box::new(CreateOrUpdateWaiter::new(client, project_id, region, target))
    })
}

/// Waits until a deleted instance is gone.
pub fn delete_waiter<'a, C: EdgeApi + 'a>(
    project_id: &str,
    region: &str,
    target: InstanceRef,
) -> WaiterFactory<'a, C, ()> {
    let (project_id, region) = (project_id.to_string(), region.to_string());
    Box::new(move |client| Box::new(DeleteWaiter::new(client, project_id, region, target)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_sdk::testing::{FakeEdgeApi, FakeResponse};
    use nimbus_sdk::{InstanceStatus, WaitError};
    use tokio_util::sync::CancellationToken;

    fn with_status(status: InstanceStatus) -> FakeResponse<Instance> {
        FakeResponse::ok(Instance {
            id: Some("edgesvc01".into()),
            status: Some(status),
            ..Instance::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn create_waiter_follows_the_identifier_form() {
        let client = FakeEdgeApi::new().on_get(vec![
            with_status(InstanceStatus::Creating),
            with_status(InstanceStatus::Active),
        ]);
        let factory = create_or_update_waiter("p", "eu01", InstanceRef::Name("edge01".into()));
        let instance = factory(&client)
            .await_terminal(&CancellationToken::new())
            .await
            .expect("active");
        assert_eq!(instance.status, Some(InstanceStatus::Active));

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.path == "/v1beta1/projects/p/regions/eu01/instancesbyname/edge01"));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_waiter_treats_not_found_as_done() {
        let client = FakeEdgeApi::new().on_get(vec![
            with_status(InstanceStatus::Deleting),
            FakeResponse::status(404, "not found"),
        ]);
        let factory = delete_waiter("p", "eu01", InstanceRef::Id("edgesvc01".into()));
        factory(&client)
            .await_terminal(&CancellationToken::new())
            .await
            .expect("gone");
        assert_eq!(
            client.calls()[0].path,
            "/v1beta1/projects/p/regions/eu01/instances/edgesvc01"
        );
    }

    #[tokio::test]
    async fn delete_waiter_reports_failure_state() {
        let client = FakeEdgeApi::new().on_get(vec![with_status(InstanceStatus::Error)]);
        let err = delete_waiter("p", "eu01", InstanceRef::Id("edgesvc01".into()))(&client)
            .await_terminal(&CancellationToken::new())
            .await
            .expect_err("failed");
        assert!(matches!(err, WaitError::Failed(InstanceStatus::Error)));
    }
}
