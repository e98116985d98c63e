//! Inclusion and exclusion validators
//!
//! Membership uses structural equality on [`Value`], so lists and maps
//! compare element by element.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::{render_values, Validator};
use crate::error::FieldError;
use crate::value::Value;

/// Validates that a value is one of the allowed values
#[derive(Debug, Clone, PartialEq)]
pub struct Inclusion {
    pub allowed: Vec<Value>,
}

impl Inclusion {
    pub fn new<I, V>(allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for Inclusion {
    fn validate(&self, field: &str, value: &Value) -> Result<(), FieldError> {
        if self.allowed.contains(value) {
            return Ok(());
        }

        let expected = format!("one of {}", render_values(&self.allowed));
        Err(FieldError::rejected(
            field,
            format!("{} is invalid, {} is not {}", field, value, expected),
            FieldError::create_violation("inclusion", expected, value.to_string()),
        ))
    }
}

/// Validates that a value is none of the disallowed values
#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub disallowed: Vec<Value>,
}

impl Exclusion {
    pub fn new<I, V>(disallowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            disallowed: disallowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for Exclusion {
    fn validate(&self, field: &str, value: &Value) -> Result<(), FieldError> {
        if !self.disallowed.contains(value) {
            return Ok(());
        }

        let expected = format!("none of {}", render_values(&self.disallowed));
        Err(FieldError::rejected(
            field,
            format!("{} is reserved, {} is one of {}", field, value, render_values(&self.disallowed)),
            FieldError::create_violation("exclusion", expected, value.to_string()),
        ))
    }
}
