//! # nimbus-cli
//!
//! Nimbus command-line interface.
//!
//! Provides commands for:
//! - Edge instance lifecycle (create, delete, describe, list, update)
//! - Edge plans
//! - Instance tokens and kubeconfigs
//! - The persistent CLI configuration
//!
//! # Architecture
//!
//! Every leaf command runs the same pipeline. Dependencies point downward,
//! and each stage can be replaced in tests.
//!
//! ```text
//! parse_input ──► build_request ──► Executor ──► waiter ──► output_result
//!  (globals,       (RequestSpec)    (cancel,     (spinner)   (Printer)
//!   identifier)                      errors)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod globals;
pub mod identifier;
pub mod printer;
pub mod project;
pub mod request;
pub mod spinner;
pub mod table;
pub mod waiter;

pub use cli::{Cli, Commands};
pub use error::CliError;
pub use executor::{Executor, NotFoundPolicy};
pub use globals::{GlobalFlags, OutputFormat, Verbosity};
pub use identifier::{Identifier, IdentifierForm};
pub use printer::Printer;
pub use request::RequestSpec;
