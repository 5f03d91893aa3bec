//! Kubeconfig error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a kubeconfig document could not be loaded.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("read {path:?}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// The content is not a valid kubeconfig.
    #[error(transparent)]
    Parse(#[from] serde_yaml::Error),

    /// Two entries of the same list share a name.
    #[error("duplicate {list} entry {name:?}")]
    DuplicateName {
        /// The list (`clusters`, `users` or `contexts`).
        list: &'static str,
        /// The repeated name.
        name: String,
    },

    /// An entry has an empty name.
    #[error("{list} entry without a name")]
    MissingName {
        /// The list (`clusters`, `users` or `contexts`).
        list: &'static str,
    },
}

/// Errors returned when writing a kubeconfig.
#[derive(Debug, Error)]
pub enum KubeconfigError {
    /// The issued document is empty.
    #[error("no data for kubeconfig")]
    Empty,

    /// The issued document or the existing file could not be loaded.
    #[error("load kubeconfig: {0}")]
    Load(#[from] DocumentError),

    /// The file could not be written.
    #[error("write kubeconfig: {0}")]
    Write(#[source] io::Error),

    /// The target path cannot hold a kubeconfig.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The operator declined the confirmation prompt.
    #[error("kubeconfig {0:?} was left unchanged: operation not confirmed")]
    Declined(PathBuf),

    /// The confirmation prompt could not be shown or answered.
    #[error("confirmation prompt failed: {0}")]
    Prompt(#[source] io::Error),
}
