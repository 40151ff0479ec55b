//! Per-resource operation timeouts
//!
//! Users may override how long create, update and delete wait through a
//! `timeouts` block of duration strings such as `"45m"`, `"3h"` or `"1h30m"`.

use crate::domain::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The `timeouts` block of a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTimeouts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
}

impl ResourceTimeouts {
    pub fn is_empty(&self) -> bool {
        self.create.is_none() && self.update.is_none() && self.delete.is_none()
    }

    /// Create timeout, or `default` when not set
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Validation`] for an unparsable duration
    pub fn create_or(&self, default: Duration) -> Result<Duration> {
        resolve(self.create.as_deref(), "create", default)
    }

    pub fn update_or(&self, default: Duration) -> Result<Duration> {
        resolve(self.update.as_deref(), "update", default)
    }

    pub fn delete_or(&self, default: Duration) -> Result<Duration> {
        resolve(self.delete.as_deref(), "delete", default)
    }

    /// Checks every configured value without using it
    pub fn validate(&self) -> Result<()> {
        self.create_or(Duration::ZERO)?;
        self.update_or(Duration::ZERO)?;
        self.delete_or(Duration::ZERO)?;
        Ok(())
    }
}

fn resolve(value: Option<&str>, operation: &str, default: Duration) -> Result<Duration> {
    match value {
        None => Ok(default),
        Some(raw) => parse_duration(raw).map_err(|e| {
            ProviderError::Validation(format!("timeouts.{operation}: {e}"))
        }),
    }
}

/// Parses a duration written as a sequence of `<number><unit>` terms
///
/// Units: `h`, `m`, `s`, `ms`. Numbers may be fractional (`"1.5h"`).
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = 0.0_f64;
    let mut rest = input;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration '{input}'"));
        }

        let number: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid number in duration '{input}'"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "h" => 3600.0,
            "m" => 60.0,
            "s" => 1.0,
            "ms" => 0.001,
            "" => return Err(format!("missing unit in duration '{input}'")),
            unit => return Err(format!("unknown unit '{unit}' in duration '{input}'")),
        };
        rest = &rest[unit_len..];

        total += number * seconds_per_unit;
    }

    Duration::try_from_secs_f64(total).map_err(|_| format!("duration '{input}' is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("45m", 2700 ; "minutes")]
    #[test_case("3h", 10800 ; "hours")]
    #[test_case("90s", 90 ; "seconds")]
    #[test_case("1h30m", 5400 ; "compound")]
    #[test_case("1.5h", 5400 ; "fractional")]
    #[test_case("0", 0 ; "zero")]
    fn test_parse_duration(input: &str, seconds: u64) {
        assert_eq!(parse_duration(input).unwrap(), Duration::from_secs(seconds));
    }

    #[test]
    fn test_parse_milliseconds() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test_case("" ; "empty")]
    #[test_case("10" ; "missing unit")]
    #[test_case("5d" ; "unknown unit")]
    #[test_case("m5" ; "unit first")]
    #[test_case("99999999999999999999h" ; "out of range")]
    fn test_parse_duration_rejects(input: &str) {
        assert!(parse_duration(input).is_err());
    }

    #[test]
    fn test_defaults_and_overrides() {
        let timeouts = ResourceTimeouts {
            create: Some("2h".to_string()),
            ..Default::default()
        };

        assert_eq!(
            timeouts.create_or(Duration::from_secs(60)).unwrap(),
            Duration::from_secs(7200)
        );
        assert_eq!(
            timeouts.delete_or(Duration::from_secs(60)).unwrap(),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_invalid_value_names_operation() {
        let timeouts = ResourceTimeouts {
            delete: Some("soon".to_string()),
            ..Default::default()
        };

        let err = timeouts.validate().unwrap_err();
        assert!(err.to_string().contains("timeouts.delete"));
    }

    #[test]
    fn test_out_of_range_value_is_validation_error() {
        let timeouts = ResourceTimeouts {
            create: Some("99999999999999999999h".to_string()),
            ..Default::default()
        };

        let err = timeouts.validate().unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(err.to_string().contains("out of range"));
    }
}
