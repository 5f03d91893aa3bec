//! String validation functions.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::{
    DESCRIPTION_MAX_LENGTH, DISPLAY_NAME_MAX_LENGTH, DISPLAY_NAME_MIN_LENGTH,
    INSTANCE_ID_MAX_LENGTH, INSTANCE_ID_MIN_LENGTH,
};

const INSTANCE_ID_PATTERN: &str = r"^[a-z0-9-]+$";

/// Starts with a letter, never ends with a hyphen.
const DISPLAY_NAME_PATTERN: &str = r"^[a-z]([-a-z0-9]*[a-z0-9])?$";

static INSTANCE_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(INSTANCE_ID_PATTERN).unwrap_or_else(|_| unreachable!()));

static DISPLAY_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DISPLAY_NAME_PATTERN).unwrap_or_else(|_| unreachable!()));

/// Check that `value` is non-empty and its length lies within `[min, max]`.
fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::empty(field));
    }
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::too_short(field, min, len));
    }
    if len > max {
        return Err(ValidationError::too_long(field, max, len));
    }
    Ok(())
}

fn check_pattern(field: &str, value: &str, regex: &Regex) -> Result<(), ValidationError> {
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::pattern_mismatch(field, regex.as_str()))
    }
}

/// Validate an instance identifier.
///
/// Identifiers are 4-11 characters of lowercase letters, digits and hyphens.
///
/// # Errors
///
/// Returns `ValidationError` if the identifier is empty, out of bounds, or
/// contains other characters.
pub fn validate_instance_id(value: &str) -> Result<(), ValidationError> {
    let field = "instance-id";
    check_length(field, value, INSTANCE_ID_MIN_LENGTH, INSTANCE_ID_MAX_LENGTH)?;
    check_pattern(field, value, &INSTANCE_ID_REGEX)
}

/// Validate an instance display name.
///
/// Display names must:
/// - Be 4-8 characters
/// - Start with a lowercase letter
/// - Contain only lowercase letters, digits and hyphens
/// - Not end with a hyphen
///
/// # Errors
///
/// Returns `ValidationError` if the name is invalid.
///
/// # Example
///
/// ```
/// use nimbus_validation::validate_display_name;
///
/// assert!(validate_display_name("edge01").is_ok());
/// assert!(validate_display_name("edge-").is_err());
/// ```
pub fn validate_display_name(value: &str) -> Result<(), ValidationError> {
    let field = "display-name";
    check_length(field, value, DISPLAY_NAME_MIN_LENGTH, DISPLAY_NAME_MAX_LENGTH)?;
    check_pattern(field, value, &DISPLAY_NAME_REGEX)
}

/// Validate a free-text description. Empty descriptions are allowed.
///
/// # Errors
///
/// Returns `ValidationError` if the description is too long.
pub fn validate_description(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > DESCRIPTION_MAX_LENGTH {
        return Err(ValidationError::too_long(
            "description",
            DESCRIPTION_MAX_LENGTH,
            len,
        ));
    }
    Ok(())
}

/// Validate a UUID-shaped value and return the parsed UUID.
///
/// Accepts the hyphenated, simple, braced and URN forms.
///
/// # Errors
///
/// Returns `ValidationError` if the value is empty or not a UUID.
pub fn validate_uuid(field: &str, value: &str) -> Result<Uuid, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::empty(field));
    }
    Uuid::parse_str(value).map_err(|e| ValidationError::invalid_uuid(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationErrorKind;
    use test_case::test_case;

    #[test_case("edge" ; "minimum length")]
    #[test_case("edgesvc01" ; "typical")]
    #[test_case("abcdefghijk" ; "maximum length")]
    #[test_case("1234" ; "digits only")]
    #[test_case("ed-ge" ; "hyphen")]
    fn instance_id_valid(value: &str) {
        assert!(validate_instance_id(value).is_ok());
    }

    #[test_case("" => ValidationErrorKind::Empty ; "empty")]
    #[test_case("abc" => ValidationErrorKind::TooShort { min: 4, actual: 3 } ; "one below minimum")]
    #[test_case("id" => ValidationErrorKind::TooShort { min: 4, actual: 2 } ; "well below minimum")]
    #[test_case("abcdefghijkl" => ValidationErrorKind::TooLong { max: 11, actual: 12 } ; "one above maximum")]
    fn instance_id_length_errors(value: &str) -> ValidationErrorKind {
        validate_instance_id(value).map_err(|e| e.kind).unwrap_err()
    }

    #[test_case("Edge01" ; "uppercase")]
    #[test_case("edge_01" ; "underscore")]
    #[test_case("edge 01" ; "space")]
    fn instance_id_bad_characters(value: &str) {
        let err = validate_instance_id(value).unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::PatternMismatch { .. }));
        assert_eq!(err.field, "instance-id");
    }

    #[test_case("test" ; "minimum length")]
    #[test_case("testname" ; "maximum length")]
    #[test_case("edge01" ; "digits after letter")]
    #[test_case("ed-ge" ; "inner hyphen")]
    fn display_name_valid(value: &str) {
        assert!(validate_display_name(value).is_ok());
    }

    #[test_case("abc" ; "too short")]
    #[test_case("verylongname" ; "too long")]
    #[test_case("1test" ; "leading digit")]
    #[test_case("-test" ; "leading hyphen")]
    #[test_case("test-" ; "trailing hyphen")]
    #[test_case("Test" ; "uppercase")]
    #[test_case("test@" ; "symbol")]
    fn display_name_invalid(value: &str) {
        let err = validate_display_name(value).unwrap_err();
        assert_eq!(err.field, "display-name");
    }

    #[test]
    fn display_name_bounds_are_exact() {
        assert!(validate_display_name("abcd").is_ok());
        assert!(validate_display_name("abc").is_err());
        assert!(validate_display_name("abcdefgh").is_ok());
        assert!(validate_display_name("abcdefghi").is_err());
    }

    #[test]
    fn description_boundary() {
        let at_max = "a".repeat(DESCRIPTION_MAX_LENGTH);
        let over = "a".repeat(DESCRIPTION_MAX_LENGTH + 1);
        assert!(validate_description("").is_ok());
        assert!(validate_description(&at_max).is_ok());
        assert!(validate_description(&over).is_err());
    }

    #[test_case("550e8400-e29b-41d4-a716-446655440000" ; "hyphenated")]
    #[test_case("550e8400e29b41d4a716446655440000" ; "simple")]
    fn uuid_valid(value: &str) {
        let parsed = validate_uuid("plan-id", value).expect("should parse");
        assert_eq!(parsed.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn uuid_invalid() {
        let err = validate_uuid("plan-id", "not-a-uuid").unwrap_err();
        assert!(err.to_string().starts_with("plan-id is not a valid UUID"));
        assert_eq!(
            validate_uuid("plan-id", "").unwrap_err().kind,
            ValidationErrorKind::Empty
        );
    }
}
