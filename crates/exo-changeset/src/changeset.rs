//! The changeset: cast, chain operations and accessors
//!
//! A [`Changeset`] is created by casting an untyped payload against a
//! [`Record`] schema, refined by a chain of builder-style operations, and
//! finally materialized by [`crate::apply`]. Every chain operation consumes
//! the changeset and returns it; field failures are recorded in `errors`
//! instead of being returned, so chains compose regardless of earlier
//! failures.
//!
//! Containers are shared copy-on-write. Cloning a changeset is cheap and the
//! first write on either branch copies the container it touches, so branches
//! never observe each other's mutations.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::config::ChangesetConfig;
use crate::error::{ChangesetErrors, Error, ErrorKind, FieldError, Result};
use crate::schema::{FieldDescriptor, FieldType, Record, Schema};
use crate::validators::Validator;
use crate::value::{Params, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A payload-to-record transformation in progress
#[derive(Clone)]
pub struct Changeset<T> {
    params: Arc<Params>,
    changes: Arc<BTreeMap<String, Value>>,
    errors: Arc<BTreeMap<String, FieldError>>,
    validations: Arc<BTreeMap<String, Arc<dyn Validator>>>,
    schema: Arc<Schema>,
    data: T,
    config: ChangesetConfig,
    is_valid: bool,
}

impl<T: fmt::Debug> fmt::Debug for Changeset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Changeset")
            .field("params", &self.params)
            .field("changes", &self.changes)
            .field("errors", &self.errors)
            .field("validations", &self.validations)
            .field("data", &self.data)
            .field("is_valid", &self.is_valid)
            .finish()
    }
}

impl<T: Record + Default> Changeset<T> {
    /// Cast `params` onto a default instance of `T`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use exo_changeset::{params, Changeset, Record};
    ///
    /// #[derive(Debug, Default, Record)]
    /// struct Post {
    ///     title: String,
    ///     views: i64,
    /// }
    ///
    /// let changeset = Changeset::<Post>::cast(params! { "title" => "hello", "views" => "many" });
    /// assert!(!changeset.is_valid());
    /// assert!(changeset.get_change("title").is_some());
    /// assert!(changeset.get_change("views").is_none());
    /// ```
    pub fn cast(params: Params) -> Self {
        Self::cast_with(T::default(), params)
    }

    /// Cast a JSON object payload
    pub fn cast_json(payload: serde_json::Value) -> Result<Self> {
        match Value::from(payload) {
            Value::Map(params) => Ok(Self::cast(params)),
            other => Err(Error::PayloadNotObject {
                actual: other.kind().to_string(),
            }),
        }
    }

    /// Parse JSON text and cast it
    pub fn cast_str(payload: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(payload)?;
        Self::cast_json(json)
    }
}

impl<T: Record> Changeset<T> {
    /// Cast `params` onto a caller-supplied instance
    pub fn cast_with(data: T, params: Params) -> Self {
        Self::cast_with_config(data, params, ChangesetConfig::default())
    }

    /// Cast with an explicit configuration
    ///
    /// Fields absent from `params` are skipped; present fields are copied into
    /// `changes` only if the field's type can hold them. Keys that are
    /// not schema fields stay in `params` and nowhere else.
    pub fn cast_with_config(data: T, params: Params, config: ChangesetConfig) -> Self {
        let schema = T::schema();
        let mut changeset = Self {
            params: Arc::new(Params::new()),
            changes: Arc::new(BTreeMap::new()),
            errors: Arc::new(BTreeMap::new()),
            validations: Arc::new(BTreeMap::new()),
            schema: Arc::new(Schema::default()),
            data,
            config,
            is_valid: true,
        };

        let mut changes = BTreeMap::new();
        for descriptor in schema.fields() {
            let Some(value) = params.get(descriptor.name) else {
                continue;
            };

            match changeset.coerce(descriptor, value.clone()) {
                Ok(accepted) => {
                    changes.insert(descriptor.name.to_string(), accepted);
                }
                Err(rejected) => {
                    let error = type_mismatch(descriptor.name, &descriptor.ty, &rejected);
                    log::debug!("Cast rejected field '{}': {}", descriptor.name, error.message);
                    changeset.record(error);
                }
            }
        }

        changeset.params = Arc::new(params);
        changeset.changes = Arc::new(changes);
        changeset.schema = Arc::new(schema);
        changeset
    }

    /// Write a change, checking only that the field exists and the type fits
    ///
    /// Overwrites any existing change for the field.
    pub fn put_change(mut self, field: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        let Some(descriptor) = self.schema.field(field) else {
            self.record(FieldError::new(
                field,
                ErrorKind::InvalidField,
                format!("{} is invalid", field),
            ));
            return self;
        };

        let descriptor = descriptor.clone();
        match self.coerce(&descriptor, value) {
            Ok(accepted) => {
                Arc::make_mut(&mut self.changes).insert(field.to_string(), accepted);
            }
            Err(rejected) => {
                self.record(type_mismatch(field, &descriptor.ty, &rejected));
            }
        }
        self
    }

    /// Transform the current change for a field
    ///
    /// `transform` receives `None` when the field has no change. A failure is
    /// recorded against the field; a success behaves like [`Self::put_change`].
    pub fn update_change<F, V, E>(mut self, field: &str, transform: F) -> Self
    where
        F: FnOnce(Option<&Value>) -> std::result::Result<V, E>,
        V: Into<Value>,
        E: fmt::Display,
    {
        match transform(self.changes.get(field)) {
            Ok(value) => self.put_change(field, value),
            Err(err) => {
                self.record(FieldError::new(field, ErrorKind::TransformFailure, err.to_string()));
                self
            }
        }
    }

    /// Remove a change, leaving any recorded error in place
    pub fn delete_change(mut self, field: &str) -> Self {
        if self.changes.contains_key(field) {
            Arc::make_mut(&mut self.changes).remove(field);
        }
        self
    }

    /// Require every listed field to have a non-null change
    pub fn validate_required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            let field = field.as_ref();
            if self.is_field_missing(field) {
                self.record(FieldError::new(field, ErrorKind::RequiredMissing, "is required"));
            }
        }
        self
    }

    /// Run `validator` against the change for `field`
    ///
    /// The validator is kept as the field's provenance even when the field
    /// has no change.
    pub fn validate_change<V: Validator>(self, field: &str, validator: V) -> Self {
        self.validate_with(field, Arc::new(validator))
    }

    /// Run one validator against each listed field in order
    pub fn validate_changes<V, I, S>(mut self, fields: I, validator: V) -> Self
    where
        V: Validator,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let validator: Arc<dyn Validator> = Arc::new(validator);
        for field in fields {
            self = self.validate_with(field.as_ref(), Arc::clone(&validator));
        }
        self
    }

    fn validate_with(mut self, field: &str, validator: Arc<dyn Validator>) -> Self {
        Arc::make_mut(&mut self.validations).insert(field.to_string(), Arc::clone(&validator));

        let outcome = match self.changes.get(field) {
            None => Err(FieldError::new(field, ErrorKind::MissingChange, "doesn't exist")),
            Some(value) => validator.validate(field, value),
        };

        if let Err(error) = outcome {
            self.record(error);
        }
        self
    }

    /// Record an error without running a validator
    ///
    /// Replaces any previous error for the field.
    pub fn add_error(mut self, field: &str, message: impl Into<String>) -> Self {
        self.record(FieldError::new(field, ErrorKind::Custom, message));
        self
    }

    /// Re-render every error with the validator that produced it
    ///
    /// The callback receives `None` for errors that did not come from a
    /// validator run.
    pub fn traverse_errors<R, F>(&self, mut render: F) -> BTreeMap<String, R>
    where
        F: FnMut(&Self, &FieldError, Option<&dyn Validator>) -> R,
    {
        self.errors
            .iter()
            .map(|(field, error)| {
                let validator = self.validation(field);
                (field.clone(), render(self, error, validator))
            })
            .collect()
    }

    pub fn get_change(&self, field: &str) -> Option<&Value> {
        self.changes.get(field)
    }

    pub fn changes(&self) -> &BTreeMap<String, Value> {
        &self.changes
    }

    /// The payload exactly as given to the cast
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn errors(&self) -> &BTreeMap<String, FieldError> {
        &self.errors
    }

    pub fn get_error(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// The most recent validator applied to each field
    pub fn validations(&self) -> &BTreeMap<String, Arc<dyn Validator>> {
        &self.validations
    }

    pub fn validation(&self, field: &str) -> Option<&dyn Validator> {
        self.validations.get(field).map(|v| v.as_ref())
    }

    /// Whether `field` has no change, or a null one
    ///
    /// Same check as [`Self::validate_required`] for a single field, for
    /// rules like "at least one of these fields".
    pub fn is_field_missing(&self, field: &str) -> bool {
        self.changes.get(field).map_or(true, Value::is_null)
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ChangesetConfig {
        &self.config
    }

    /// Snapshot of the current errors as an aggregate
    pub fn to_errors(&self) -> ChangesetErrors {
        ChangesetErrors::new(self.errors.as_ref().clone())
    }

    pub(crate) fn into_parts(self) -> (T, ChangesetPayload) {
        (
            self.data,
            ChangesetPayload {
                changes: self.changes,
                errors: self.errors,
                config: self.config,
                is_valid: self.is_valid,
            },
        )
    }

    /// Records `error` and invalidates in one step
    fn record(&mut self, error: FieldError) {
        Arc::make_mut(&mut self.errors).insert(error.field.clone(), error);
        self.is_valid = false;
    }

    /// Accept `value` for the field, widening integers when configured
    fn coerce(&self, descriptor: &FieldDescriptor, value: Value) -> std::result::Result<Value, Value> {
        if descriptor.accepts(&value) {
            return Ok(value);
        }
        match value {
            Value::Int(i) if self.config.widen_integers && descriptor.ty.is_float() => {
                let widened = Value::Float(i as f64);
                if descriptor.accepts(&widened) {
                    Ok(widened)
                } else {
                    Err(Value::Int(i))
                }
            }
            other => Err(other),
        }
    }
}

/// What materialization needs once the record instance is split off
pub(crate) struct ChangesetPayload {
    pub(crate) changes: Arc<BTreeMap<String, Value>>,
    pub(crate) errors: Arc<BTreeMap<String, FieldError>>,
    pub(crate) config: ChangesetConfig,
    pub(crate) is_valid: bool,
}

impl ChangesetPayload {
    /// Records a terminal error and returns the aggregate
    pub(crate) fn fail(mut self, error: FieldError) -> ChangesetErrors {
        Arc::make_mut(&mut self.errors).insert(error.field.clone(), error);
        self.into_errors()
    }

    pub(crate) fn into_errors(self) -> ChangesetErrors {
        ChangesetErrors::new(Arc::try_unwrap(self.errors).unwrap_or_else(|shared| (*shared).clone()))
    }
}

fn type_mismatch(field: &str, expected: &FieldType, actual: &Value) -> FieldError {
    // A value of the right shape failed on element type or integer range
    let message = if expected.accepts(actual) {
        format!("type mismatch: cannot cast {} to {}", actual, expected)
    } else {
        format!("type mismatch: expected {}, got {}", expected, actual.kind())
    };
    FieldError::new(field, ErrorKind::CastTypeMismatch, message)
}
