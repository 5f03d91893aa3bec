//! Human-readable project labels for prompts and messages.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use nimbus_sdk::ProjectApi;

use crate::error::CliError;

/// The project's name, or its id when the name cannot be fetched.
///
/// # Errors
///
/// Returns [`CliError::Cancelled`] if `cancel` fires during the lookup.
pub async fn project_label<C: ProjectApi>(
    client: &C,
    project_id: &str,
    cancel: &CancellationToken,
) -> Result<String, CliError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CliError::Cancelled),
        label = lookup(client, project_id) => Ok(label),
    }
}

async fn lookup<C: ProjectApi>(client: &C, project_id: &str) -> String {
    match client.get_project(project_id).await {
        Ok(Some(project)) => match project.name {
            Some(name) if !name.is_empty() => name,
            _ => project_id.to_string(),
        },
        Ok(None) => project_id.to_string(),
        Err(e) => {
            debug!(project_id, error = %e, "Could not get project name");
            project_id.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_sdk::Project;
    use nimbus_sdk::testing::{FakeEdgeApi, FakeResponse};

    #[tokio::test]
    async fn uses_project_name() {
        let client = FakeEdgeApi::new().on_project(FakeResponse::ok(Project {
            project_id: Some("p".into()),
            name: Some("Edge Team".into()),
        }));
        let label = project_label(&client, "p", &CancellationToken::new()).await;
        assert_eq!(label.expect("label"), "Edge Team");
    }

    #[tokio::test]
    async fn falls_back_to_id() {
        let client = FakeEdgeApi::new().on_project(FakeResponse::status(403, "forbidden"));
        let cancel = CancellationToken::new();
        assert_eq!(project_label(&client, "p", &cancel).await.expect("label"), "p");
        let unscripted = project_label(&FakeEdgeApi::new(), "p", &cancel).await;
        assert_eq!(unscripted.expect("label"), "p");
    }

    #[tokio::test]
    async fn interrupt_ends_the_lookup() {
        let client = FakeEdgeApi::new().on_project(FakeResponse::ok(Project {
            project_id: Some("p".into()),
            name: Some("Edge Team".into()),
        }));
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            project_label(&client, "p", &cancel).await,
            Err(CliError::Cancelled)
        ));
        assert!(client.calls().is_empty());
    }
}
