//! Parsing of `<value><unit>` duration strings into seconds.
//!
//! Supported units:
//! - `s`: seconds
//! - `m`: minutes
//! - `h`: hours
//! - `d`: days (24 hours)
//! - `M`: months, calendar-aware relative to a reference time
//!
//! Units cannot be combined (`1h30m` is rejected), and the value must be a
//! positive integer without leading zeros.

use chrono::{DateTime, Months, Utc};
use thiserror::Error;

/// Units accepted by [`DurationParser`], in display order.
pub const SUPPORTED_UNITS: [&str; 5] = ["s", "m", "h", "d", "M"];

/// Error returned when a duration string cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// Input was empty.
    #[error("invalid time string format: input string is empty")]
    Empty,
    /// Input had a structural problem.
    #[error("invalid time string format {input:?}: {reason}")]
    InvalidFormat {
        /// The offending input.
        input: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The numeric part could not be used.
    #[error("invalid time value {input:?}: {reason}")]
    InvalidValue {
        /// The offending value.
        input: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The unit is not one of [`SUPPORTED_UNITS`].
    #[error("invalid time unit {unit:?}, supported units are {}", SUPPORTED_UNITS.join(", "))]
    InvalidUnit {
        /// The unit that was given.
        unit: String,
    },
    /// The result does not fit in the supported range.
    #[error("calculation result is out of bounds (value: {value})")]
    OutOfBounds {
        /// The numeric value that overflowed.
        value: u64,
    },
    /// The duration is shorter than the configured minimum.
    #[error("duration is below minimum: {value} seconds (minimum: {minimum} seconds)")]
    BelowMinimum {
        /// Converted duration.
        value: u64,
        /// Configured minimum.
        minimum: u64,
    },
    /// The duration is longer than the configured maximum.
    #[error("duration exceeds maximum: {value} seconds (maximum: {maximum} seconds)")]
    AboveMaximum {
        /// Converted duration.
        value: u64,
        /// Configured maximum.
        maximum: u64,
    },
}

/// Converts duration strings to seconds with optional bounds.
///
/// # Example
///
/// ```
/// use nimbus_validation::duration::DurationParser;
///
/// let parser = DurationParser::new().min_seconds(60).max_seconds(7200);
/// assert_eq!(parser.parse("30m")?, 1800);
/// assert!(parser.parse("3h").is_err());
/// # Ok::<(), nimbus_validation::duration::DurationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DurationParser {
    min_seconds: Option<u64>,
    max_seconds: Option<u64>,
    now: Option<DateTime<Utc>>,
}

impl DurationParser {
    /// Create a parser without bounds that measures months from the current time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject durations shorter than `seconds`.
    #[must_use]
    pub fn min_seconds(mut self, seconds: u64) -> Self {
        self.min_seconds = Some(seconds);
        self
    }

    /// Reject durations longer than `seconds`. Zero removes the limit.
    #[must_use]
    pub fn max_seconds(mut self, seconds: u64) -> Self {
        self.max_seconds = (seconds != 0).then_some(seconds);
        self
    }

    /// Measure calendar months from `now` instead of the current time.
    #[must_use]
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Convert `input` to seconds.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns `DurationError` if the string is malformed, uses an unknown
    /// unit, overflows, or falls outside the configured bounds.
    pub fn parse(&self, input: &str) -> Result<u64, DurationError> {
        let input = input.trim();
        let (value_str, unit) = split_value_and_unit(input)?;

        if value_str.len() > 1 && value_str.starts_with('0') {
            return Err(DurationError::InvalidFormat {
                input: input.to_string(),
                reason: "leading zeros are not allowed",
            });
        }

        let value: u64 = value_str.parse().map_err(|e: std::num::ParseIntError| {
            DurationError::InvalidValue {
                input: value_str.to_string(),
                reason: e.to_string(),
            }
        })?;
        if value == 0 {
            return Err(DurationError::InvalidValue {
                input: "0".to_string(),
                reason: "a value of 0 is not allowed".to_string(),
            });
        }

        let seconds = match unit {
            "s" => fixed(value, 1)?,
            "m" => fixed(value, 60)?,
            "h" => fixed(value, 60 * 60)?,
            "d" => fixed(value, 24 * 60 * 60)?,
            "M" => months(value, self.now.unwrap_or_else(Utc::now))?,
            other => {
                return Err(DurationError::InvalidUnit {
                    unit: other.to_string(),
                });
            }
        };

        if let Some(minimum) = self.min_seconds {
            if seconds < minimum {
                return Err(DurationError::BelowMinimum {
                    value: seconds,
                    minimum,
                });
            }
        }
        if let Some(maximum) = self.max_seconds {
            if seconds > maximum {
                return Err(DurationError::AboveMaximum {
                    value: seconds,
                    maximum,
                });
            }
        }
        Ok(seconds)
    }
}

/// Convert a duration string to seconds without bounds.
///
/// # Errors
///
/// See [`DurationParser::parse`].
pub fn convert_to_seconds(input: &str) -> Result<u64, DurationError> {
    DurationParser::new().parse(input)
}

fn split_value_and_unit(input: &str) -> Result<(&str, &str), DurationError> {
    if input.is_empty() {
        return Err(DurationError::Empty);
    }

    let split = input.char_indices().find(|(_, c)| !c.is_ascii_digit());
    match split {
        Some((_, '.' | ',')) => Err(DurationError::InvalidValue {
            input: input.to_string(),
            reason: "floating-point values are not supported".to_string(),
        }),
        None => Err(DurationError::InvalidFormat {
            input: input.to_string(),
            reason: "contains no unit, expected format <value><unit>",
        }),
        Some((0, _)) => Err(DurationError::InvalidFormat {
            input: input.to_string(),
            reason: "must start with a number, expected format <value><unit>",
        }),
        Some((index, _)) => Ok(input.split_at(index)),
    }
}

fn fixed(value: u64, multiplier: u64) -> Result<u64, DurationError> {
    value
        .checked_mul(multiplier)
        .filter(|seconds| i64::try_from(*seconds).is_ok())
        .ok_or(DurationError::OutOfBounds { value })
}

fn months(value: u64, now: DateTime<Utc>) -> Result<u64, DurationError> {
    let count = u32::try_from(value).map_err(|_| DurationError::OutOfBounds { value })?;
    let future = now
        .checked_add_months(Months::new(count))
        .ok_or(DurationError::OutOfBounds { value })?;
    u64::try_from((future - now).num_seconds()).map_err(|_| DurationError::OutOfBounds { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn jan_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date")
    }

    #[test_case("1s" => 1 ; "seconds")]
    #[test_case("30m" => 1800 ; "minutes")]
    #[test_case("2h" => 7200 ; "hours")]
    #[test_case("7d" => 604_800 ; "days")]
    #[test_case(" 10m " => 600 ; "surrounding whitespace")]
    fn fixed_units(input: &str) -> u64 {
        convert_to_seconds(input).expect("should convert")
    }

    #[test]
    fn months_follow_the_calendar() {
        let parser = DurationParser::new().now(jan_first());
        // January has 31 days, 2024 is a leap year.
        assert_eq!(parser.parse("1M").ok(), Some(31 * 86_400));
        assert_eq!(parser.parse("2M").ok(), Some(60 * 86_400));
    }

    #[test_case("" ; "empty")]
    #[test_case("10" ; "missing unit")]
    #[test_case("m10" ; "missing value")]
    #[test_case("010m" ; "leading zero")]
    #[test_case("1.5h" ; "float")]
    #[test_case("1,5h" ; "decimal comma")]
    #[test_case("0s" ; "zero")]
    #[test_case("1h30m" ; "mixed units")]
    #[test_case("5w" ; "unknown unit")]
    #[test_case("-5m" ; "negative")]
    fn rejects(input: &str) {
        assert!(convert_to_seconds(input).is_err(), "{input} should be rejected");
    }

    #[test]
    fn unknown_unit_lists_supported_units() {
        let err = convert_to_seconds("5w").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid time unit \"w\", supported units are s, m, h, d, M"
        );
    }

    #[test]
    fn float_message() {
        let err = convert_to_seconds("1.5h").unwrap_err();
        assert!(err.to_string().contains("floating-point values are not supported"));
    }

    #[test]
    fn overflow_is_reported() {
        let err = convert_to_seconds("18446744073709551615d").unwrap_err();
        assert!(matches!(err, DurationError::OutOfBounds { .. }));
    }

    #[test]
    fn bounds_apply_after_conversion() {
        let parser = DurationParser::new().min_seconds(600).max_seconds(15_552_000);
        assert_eq!(parser.parse("10m").ok(), Some(600));
        assert_eq!(
            parser.parse("9m"),
            Err(DurationError::BelowMinimum {
                value: 540,
                minimum: 600
            })
        );
        assert_eq!(parser.parse("180d").ok(), Some(15_552_000));
        assert!(matches!(
            parser.parse("181d"),
            Err(DurationError::AboveMaximum { .. })
        ));
    }

    #[test]
    fn zero_maximum_removes_the_limit() {
        let parser = DurationParser::new().max_seconds(60).max_seconds(0);
        assert_eq!(parser.parse("2h").ok(), Some(7200));
    }
}
