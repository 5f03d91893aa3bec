//! Input validation for the Nimbus CLI.
//!
//! Every flag value entering a command passes through one of these
//! validators before any request is built. Failures carry the name of the
//! offending field and a human-readable reason, so the CLI can surface them
//! as flag validation errors without further formatting.
//!
//! # Identifiers
//!
//! ```
//! use nimbus_validation::{validate_display_name, validate_instance_id};
//!
//! validate_instance_id("edgesvc01")?;
//! validate_display_name("edge01")?;
//!
//! // Display names must start with a letter.
//! assert!(validate_display_name("1edge").is_err());
//! # Ok::<(), nimbus_validation::ValidationError>(())
//! ```
//!
//! # Durations
//!
//! ```
//! use nimbus_validation::duration::DurationParser;
//!
//! let seconds = DurationParser::new().min_seconds(600).parse("2h")?;
//! assert_eq!(seconds, 7200);
//! # Ok::<(), nimbus_validation::duration::DurationError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod duration;
mod error;
mod numeric;
mod strings;

pub use error::{ValidationError, ValidationErrorKind};
pub use numeric::{validate_expiration, validate_limit};
pub use strings::{
    validate_description, validate_display_name, validate_instance_id, validate_uuid,
};

/// Minimum length of an instance identifier.
pub const INSTANCE_ID_MIN_LENGTH: usize = 4;

/// Maximum length of an instance identifier.
pub const INSTANCE_ID_MAX_LENGTH: usize = 11;

/// Minimum length of an instance display name.
pub const DISPLAY_NAME_MIN_LENGTH: usize = 4;

/// Maximum length of an instance display name.
pub const DISPLAY_NAME_MAX_LENGTH: usize = 8;

/// Maximum length of a free-text description.
pub const DESCRIPTION_MAX_LENGTH: usize = 256;

/// Shortest credential lifetime the API accepts, in seconds (10 minutes).
pub const EXPIRATION_SECONDS_MIN: u64 = 600;

/// Longest credential lifetime the API accepts, in seconds (180 days).
pub const EXPIRATION_SECONDS_MAX: u64 = 15_552_000;

/// Credential lifetime used when the operator does not pass one (1 hour).
pub const EXPIRATION_SECONDS_DEFAULT: u64 = 3600;
