//! Numeric validation functions.

use crate::error::{ValidationError, ValidationErrorKind};
use crate::{EXPIRATION_SECONDS_MAX, EXPIRATION_SECONDS_MIN};

/// Validate a result limit. Limits must be at least 1.
///
/// # Errors
///
/// Returns `ValidationError` if the limit is zero or negative.
pub fn validate_limit(limit: i64) -> Result<u64, ValidationError> {
    if limit < 1 {
        return Err(ValidationError::new("limit", ValidationErrorKind::NotPositive));
    }
    Ok(limit as u64)
}

/// Validate a credential lifetime in seconds.
///
/// The API accepts 10 minutes up to 180 days.
///
/// # Errors
///
/// Returns `ValidationError` if the lifetime is out of range.
pub fn validate_expiration(seconds: u64) -> Result<u64, ValidationError> {
    let max = EXPIRATION_SECONDS_MAX.min(i64::MAX as u64);
    if seconds > max {
        return Err(ValidationError::new(
            "expiration",
            ValidationErrorKind::TooLarge {
                max,
                unit: "seconds",
            },
        ));
    }
    if seconds < EXPIRATION_SECONDS_MIN {
        return Err(ValidationError::new(
            "expiration",
            ValidationErrorKind::TooSmall {
                min: EXPIRATION_SECONDS_MIN,
                unit: "seconds",
            },
        ));
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0 ; "zero")]
    #[test_case(-1 ; "negative")]
    fn limit_rejects_non_positive(limit: i64) {
        let err = validate_limit(limit).unwrap_err();
        assert_eq!(err.to_string(), "limit must be greater than 0");
    }

    #[test]
    fn limit_accepts_one() {
        assert_eq!(validate_limit(1).ok(), Some(1));
    }

    #[test_case(599 => false ; "one below minimum")]
    #[test_case(600 => true ; "minimum")]
    #[test_case(3600 => true ; "default")]
    #[test_case(15_552_000 => true ; "maximum")]
    #[test_case(15_552_001 => false ; "one above maximum")]
    fn expiration_bounds(seconds: u64) -> bool {
        validate_expiration(seconds).is_ok()
    }

    #[test]
    fn expiration_messages() {
        assert_eq!(
            validate_expiration(1).unwrap_err().to_string(),
            "expiration is too small (minimum is 600 seconds)"
        );
        assert_eq!(
            validate_expiration(u64::MAX).unwrap_err().to_string(),
            "expiration is too large (maximum is 15552000 seconds)"
        );
    }
}
