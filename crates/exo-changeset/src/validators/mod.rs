//! Field validators
//!
//! A [`Validator`] checks one field's value against a single constraint. It
//! is a pure predicate: it never touches the changeset, which records the
//! returned [`FieldError`] itself.
//!
//! The built-in validators are organized into focused modules:
//! - `basic`: length, format and acceptance checks
//! - `membership`: inclusion and exclusion against a set of values
//! - `numeric`: comparisons generic over any primitive [`Number`]
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod basic;
pub mod membership;
pub mod numeric;

use crate::error::FieldError;
use crate::value::Value;
use std::any::Any;
use std::fmt;

// Re-export public API
pub use basic::{Acceptance, Format, Length};
pub use membership::{Exclusion, Inclusion};
pub use numeric::{
    EqualTo, GreaterThan, GreaterThanOrEqual, LessThan, LessThanOrEqual, NotEqualTo, Number,
};

/// Capability to check a single field value
///
/// Implement this for custom rules; the changeset keeps the instance as the
/// field's provenance so error traversal can inspect it later.
///
/// # Examples
///
/// ```rust
/// use exo_changeset::{FieldError, Validator, Value};
///
/// #[derive(Debug)]
/// struct Lowercase;
///
/// impl Validator for Lowercase {
///     fn validate(&self, field: &str, value: &Value) -> Result<(), FieldError> {
///         match value.as_str() {
///             Some(s) if s.chars().all(|c| !c.is_uppercase()) => Ok(()),
///             _ => Err(FieldError::rejected(
///                 field,
///                 format!("{} must be lowercase", field),
///                 FieldError::create_violation("lowercase", "lowercase string", value.to_string()),
///             )),
///         }
///     }
/// }
///
/// assert!(Lowercase.validate("slug", &Value::from("ok")).is_ok());
/// assert!(Lowercase.validate("slug", &Value::from("NO")).is_err());
/// ```
pub trait Validator: AsAny + fmt::Debug + Send + Sync {
    fn validate(&self, field: &str, value: &Value) -> Result<(), FieldError>;
}

/// Upcast helper backing [`Validator`] downcasting
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn Validator {
    /// The concrete validator, if it is a `V`
    pub fn downcast_ref<V: Validator>(&self) -> Option<&V> {
        self.as_any().downcast_ref::<V>()
    }

    pub fn is<V: Validator>(&self) -> bool {
        self.as_any().is::<V>()
    }
}

/// Render a value list for messages
fn render_values(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}
