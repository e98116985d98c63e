//! Length, format and acceptance validators
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::Validator;
use crate::error::FieldError;
use crate::value::Value;
use regex::Regex;

/// Validates that a string, list or map has the desired length
///
/// Give `min` and `max` the same value for an exact length. String length
/// counts Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    pub min: usize,
    pub max: usize,
}

impl Length {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn exactly(len: usize) -> Self {
        Self { min: len, max: len }
    }

    pub fn at_least(min: usize) -> Self {
        Self {
            min,
            max: usize::MAX,
        }
    }

    pub fn at_most(max: usize) -> Self {
        Self { min: 0, max }
    }
}

impl Validator for Length {
    fn validate(&self, field: &str, value: &Value) -> Result<(), FieldError> {
        let unit = match value {
            Value::String(_) => "characters",
            Value::List(_) => "items",
            Value::Map(_) => "elements",
            other => {
                return Err(FieldError::rejected(
                    field,
                    format!("{} is not a string, list or map", field),
                    FieldError::create_violation("length", "string, list or map", other.kind().to_string()),
                ));
            }
        };
        // Non-sized values are handled above
        let len = value.len().unwrap_or_default();
        let verb = if matches!(value, Value::String(_)) { "be" } else { "have" };

        let bound = if self.min == self.max {
            (len != self.min).then(|| format!("{} {}", self.min, unit))
        } else if len < self.min {
            Some(format!("at least {} {}", self.min, unit))
        } else if len > self.max {
            Some(format!("at most {} {}", self.max, unit))
        } else {
            None
        };

        match bound {
            None => Ok(()),
            Some(expected) => Err(FieldError::rejected(
                field,
                format!("{} should {} {}", field, verb, expected),
                FieldError::create_violation("length", expected, format!("{} {}", len, unit)),
            )),
        }
    }
}

/// Validates that a string matches a pattern somewhere
#[derive(Debug, Clone)]
pub struct Format {
    pub pattern: Regex,
}

impl Format {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Compile `pattern` into a format validator
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(Regex::new(pattern)?))
    }
}

impl Validator for Format {
    fn validate(&self, field: &str, value: &Value) -> Result<(), FieldError> {
        let expected = format!("string matching /{}/", self.pattern.as_str());
        let Some(text) = value.as_str() else {
            return Err(FieldError::rejected(
                field,
                format!("{} is not a string", field),
                FieldError::create_violation("format", expected, value.kind().to_string()),
            ));
        };

        if self.pattern.is_match(text) {
            return Ok(());
        }

        Err(FieldError::rejected(
            field,
            format!("{} has invalid format, expected to match /{}/", field, self.pattern.as_str()),
            FieldError::create_violation("format", expected, value.to_string()),
        ))
    }
}

/// Validates that a boolean field is `true`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Acceptance;

impl Validator for Acceptance {
    fn validate(&self, field: &str, value: &Value) -> Result<(), FieldError> {
        match value {
            Value::Bool(true) => Ok(()),
            Value::Bool(false) => Err(FieldError::rejected(
                field,
                format!("{} must be accepted", field),
                FieldError::create_violation("acceptance", "true", "false"),
            )),
            other => Err(FieldError::rejected(
                field,
                format!("{} isn't a boolean", field),
                FieldError::create_violation("acceptance", "true", other.kind().to_string()),
            )),
        }
    }
}
