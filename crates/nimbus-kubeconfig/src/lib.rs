//! # nimbus-kubeconfig
//!
//! Writes kubeconfig documents issued by the API into the operator's
//! kubeconfig file.
//!
//! ```text
//! resolve path ─► exists? ── no ──► write new file (0600)
//!                   │
//!                  yes ─► overwrite? ── yes ─► confirm ─► replace
//!                                      no ──► confirm ─► merge
//! ```
//!
//! Merging keeps every cluster, user and context already in the file and
//! replaces entries whose names collide with the new document. Unknown fields
//! survive both at the top level and inside entries. All writes go through a
//! temporary file and a rename while holding an advisory lock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
mod lock;
mod path;
mod writer;

pub use document::{Document, NamedEntry};
pub use error::{DocumentError, KubeconfigError};
pub use path::{default_path, resolve_path, validate_path};
pub use writer::{WriteOptions, write_kubeconfig};
