//! Validation error types with detailed rejection reasons.

use std::fmt;

use thiserror::Error;

/// The kind of validation error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Input was empty when a value was required.
    Empty,
    /// Input was shorter than the minimum length.
    TooShort {
        /// Minimum required length.
        min: usize,
        /// Actual length of input.
        actual: usize,
    },
    /// Input exceeded the maximum length.
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length of input.
        actual: usize,
    },
    /// Input did not match the required pattern.
    PatternMismatch {
        /// The pattern the input must match.
        pattern: String,
    },
    /// UUID was malformed.
    InvalidUuid {
        /// The parser's reason.
        reason: String,
    },
    /// Value must be strictly positive.
    NotPositive,
    /// Value was below the allowed minimum.
    TooSmall {
        /// Smallest accepted value.
        min: u64,
        /// Unit the bound is expressed in.
        unit: &'static str,
    },
    /// Value was above the allowed maximum.
    TooLarge {
        /// Largest accepted value.
        max: u64,
        /// Unit the bound is expressed in.
        unit: &'static str,
    },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "may not be empty"),
            Self::TooShort { min, .. } => {
                write!(f, "is too short (minimum length is {min} characters)")
            }
            Self::TooLong { max, .. } => {
                write!(f, "is too long (maximum length is {max} characters)")
            }
            Self::PatternMismatch { pattern } => {
                write!(f, "didn't match the required regex expression {pattern}")
            }
            Self::InvalidUuid { reason } => write!(f, "is not a valid UUID: {reason}"),
            Self::NotPositive => write!(f, "must be greater than 0"),
            Self::TooSmall { min, unit } => write!(f, "is too small (minimum is {min} {unit})"),
            Self::TooLarge { max, unit } => write!(f, "is too large (maximum is {max} {unit})"),
        }
    }
}

/// Error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {kind}")]
pub struct ValidationError {
    /// The name of the field that failed validation.
    pub field: String,
    /// The kind of validation error.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// Create an "empty" validation error.
    #[must_use]
    pub fn empty(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorKind::Empty)
    }

    /// Create a "too short" validation error.
    #[must_use]
    pub fn too_short(field: impl Into<String>, min: usize, actual: usize) -> Self {
        Self::new(field, ValidationErrorKind::TooShort { min, actual })
    }

    /// Create a "too long" validation error.
    #[must_use]
    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::new(field, ValidationErrorKind::TooLong { max, actual })
    }

    /// Create a "pattern mismatch" validation error.
    #[must_use]
    pub fn pattern_mismatch(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationErrorKind::PatternMismatch {
                pattern: pattern.into(),
            },
        )
    }

    /// Create an "invalid UUID" validation error.
    #[must_use]
    pub fn invalid_uuid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationErrorKind::InvalidUuid {
                reason: reason.into(),
            },
        )
    }

    /// The reason without the field name, for callers that name the field themselves.
    #[must_use]
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }
}
