//! CLI command implementations.
//!
//! Each leaf command follows the same pipeline: `parse_input` binds and
//! validates the flags into an input model, `build_request` turns the model
//! into a [`RequestSpec`](crate::request::RequestSpec), the
//! [`Executor`] sends it, an optional waiter drives the operation to a
//! terminal state and `output_result` renders the response.
//!
//! - [`edge`] - edge-cloud instances, plans and credentials
//! - [`config`] - the persistent CLI configuration

pub mod config;
pub mod edge;

use tokio_util::sync::CancellationToken;

use crate::executor::Executor;
use crate::globals::GlobalFlags;
use crate::printer::Printer;

pub use config::ConfigCommand;
pub use edge::EdgeCommand;

/// Name of the edge-cloud service in API error hints.
pub const EDGE_SERVICE: &str = "edge-cloud";

/// Everything a command needs besides its own arguments.
#[derive(Debug)]
pub struct Context<'a, C> {
    /// API client.
    pub client: &'a C,
    /// Output sink.
    pub printer: &'a Printer,
    /// Resolved global flags.
    pub globals: &'a GlobalFlags,
    /// Fires on operator interrupt.
    pub cancel: &'a CancellationToken,
}

impl<'a, C> Context<'a, C> {
    /// Bundle the collaborators of one invocation.
    pub fn new(
        client: &'a C,
        printer: &'a Printer,
        globals: &'a GlobalFlags,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            printer,
            globals,
            cancel,
        }
    }

    /// An executor for edge-cloud calls bound to this invocation's token.
    #[must_use]
    pub fn executor(&self) -> Executor {
        Executor::new(EDGE_SERVICE, self.cancel.clone())
    }
}
