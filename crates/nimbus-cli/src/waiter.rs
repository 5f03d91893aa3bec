//! Waiting for asynchronous operations.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use nimbus_sdk::{WaitError, Waiter};

use crate::error::CliError;
use crate::printer::Printer;

/// Builds the wait handler for an operation once the client is at hand.
pub type WaiterFactory<'a, C, R> = Box<dyn FnOnce(&'a C) -> Box<dyn Waiter<R> + 'a> + 'a>;

/// Drive `waiter` to a terminal state with a spinner showing `progress`.
///
/// # Errors
///
/// Returns [`CliError::Cancelled`] if `cancel` fires and [`CliError::Wait`]
/// for any other failure.
pub async fn await_completion<R>(
    printer: &Printer,
    waiter: &dyn Waiter<R>,
    cancel: &CancellationToken,
    operation: &str,
    progress: &str,
) -> Result<R, CliError> {
    debug!(operation, "Waiting for operation to finish");
    let spinner = printer.spinner(progress);
    let result = waiter.await_terminal(cancel).await;
    spinner.finish_and_clear();
    result.map_err(|source| match source {
        WaitError::Cancelled => CliError::Cancelled,
        source => CliError::Wait {
            operation: operation.to_string(),
            source,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use futures::FutureExt;
    use futures::future::LocalBoxFuture;

    use crate::printer::SharedBuffer;

    struct Fixed(fn() -> Result<u8, WaitError>);

    impl Waiter<u8> for Fixed {
        fn await_terminal<'s>(
            &'s self,
            _cancel: &'s CancellationToken,
        ) -> LocalBoxFuture<'s, Result<u8, WaitError>> {
            let outcome = (self.0)();
            async move { outcome }.boxed_local()
        }
    }

    fn printer() -> Printer {
        Printer::buffered(&SharedBuffer::default(), &SharedBuffer::default(), "")
    }

    #[tokio::test]
    async fn success_passes_through() {
        let value = await_completion(&printer(), &Fixed(|| Ok(3)), &CancellationToken::new(), "op", "Waiting")
            .await
            .expect("ok");
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn cancellation_is_surfaced_unchanged() {
        let err = await_completion(
            &printer(),
            &Fixed(|| Err(WaitError::Cancelled)),
            &CancellationToken::new(),
            "op",
            "Waiting",
        )
        .await
        .expect_err("cancelled");
        assert!(matches!(err, CliError::Cancelled));
    }

    #[tokio::test]
    async fn timeout_names_the_operation() {
        let err = await_completion(
            &printer(),
            &Fixed(|| Err(WaitError::Timeout(Duration::from_secs(60)))),
            &CancellationToken::new(),
            "edge instance deletion",
            "Deleting instance",
        )
        .await
        .expect_err("timeout");
        assert!(err.to_string().starts_with("wait for edge instance deletion:"));
        assert!(matches!(
            err,
            CliError::Wait { source: WaitError::Timeout(_), .. }
        ));
    }
}
