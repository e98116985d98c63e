//! Error types for changesets
//!
//! Field-scoped failures ([`FieldError`]) are accumulated inside a changeset
//! and only surface at materialization time, aggregated in
//! [`ChangesetErrors`]. The crate-level [`Error`] covers payload ingestion.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Main error type for exo operations
#[derive(Error, Debug)]
pub enum Error {
    /// JSON parsing errors while ingesting a payload
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// The payload's top-level value is not an object
    #[error("Payload must be an object, got {actual}")]
    PayloadNotObject { actual: String },

    /// The changeset carried field errors
    #[error(transparent)]
    Invalid(#[from] ChangesetErrors),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Classification of a field-scoped failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Payload value's type disagrees with the schema
    CastTypeMismatch,
    /// Write to a field that is not in the schema
    InvalidField,
    /// Listed field absent at validation time
    RequiredMissing,
    /// Validated field has no change to validate
    MissingChange,
    /// A validator rejected the value
    ValidatorFailure,
    /// An `update_change` transform failed
    TransformFailure,
    /// A change could not be assigned to the target slot
    ApplyTypeMismatch,
    /// Added through `add_error`
    Custom,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CastTypeMismatch => write!(f, "cast_type_mismatch"),
            ErrorKind::InvalidField => write!(f, "invalid_field"),
            ErrorKind::RequiredMissing => write!(f, "required_missing"),
            ErrorKind::MissingChange => write!(f, "missing_change"),
            ErrorKind::ValidatorFailure => write!(f, "validator_failure"),
            ErrorKind::TransformFailure => write!(f, "transform_failure"),
            ErrorKind::ApplyTypeMismatch => write!(f, "apply_type_mismatch"),
            ErrorKind::Custom => write!(f, "custom"),
        }
    }
}

/// The constraint a validator checked, with what it found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The validation rule that was violated
    pub rule: String,
    /// What was expected
    pub expected: String,
    /// What was actually found
    pub actual: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule '{}' violated: expected {}, but found {}",
            self.rule, self.expected, self.actual
        )
    }
}

/// A failure recorded against a single field
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct FieldError {
    pub field: String,
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Structured detail, present for validator failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation: Option<Violation>,
}

impl FieldError {
    pub fn new<F, M>(field: F, kind: ErrorKind, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
            violation: None,
        }
    }

    /// A validator failure carrying the violated rule
    pub fn rejected<F, M>(field: F, message: M, violation: Violation) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Self {
            field: field.into(),
            kind: ErrorKind::ValidatorFailure,
            message: message.into(),
            violation: Some(violation),
        }
    }

    /// Create a violation for a specific rule
    pub fn create_violation<R, E, A>(rule: R, expected: E, actual: A) -> Violation
    where
        R: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        Violation {
            rule: rule.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Every field error collected by a changeset
#[derive(Debug, Clone, PartialEq, Eq, Error, Default)]
pub struct ChangesetErrors {
    errors: BTreeMap<String, FieldError>,
}

impl fmt::Display for ChangesetErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "changeset has {} error(s):", self.errors.len())?;
        for (field, error) in &self.errors {
            write!(f, "\n\t{}: {}", field, error)?;
        }
        Ok(())
    }
}

impl ChangesetErrors {
    pub(crate) fn new(errors: BTreeMap<String, FieldError>) -> Self {
        Self { errors }
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldError)> {
        self.errors.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn into_inner(self) -> BTreeMap<String, FieldError> {
        self.errors
    }

    /// Field name to message, ready to be rendered as a response body
    pub fn to_field_map(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|(field, error)| (field.clone(), error.message.clone()))
            .collect()
    }

    /// The field map as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.errors
                .iter()
                .map(|(field, error)| {
                    (field.clone(), serde_json::Value::String(error.message.clone()))
                })
                .collect(),
        )
    }
}

impl Serialize for ChangesetErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, error) in &self.errors {
            map.serialize_entry(field, &error.message)?;
        }
        map.end()
    }
}
