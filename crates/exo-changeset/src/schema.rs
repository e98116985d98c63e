//! Static schema description for target records
//!
//! A [`Record`] describes its own shape as an ordered table of
//! [`FieldDescriptor`]s and exposes a slot accessor ([`Record::assign`]) that
//! writes a [`Value`] into a named field. The table is normally generated by
//! `#[derive(Record)]`, but can be written by hand for types that need
//! custom slot handling.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::value::{Params, Value, ValueKind};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Declared type of a record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
    /// Accepts any value
    Any,
    /// Accepts `Null` or the inner type
    Optional(Box<FieldType>),
}

impl FieldType {
    /// Whether a value of this shape may be stored in a field of this type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Any, _) => true,
            (FieldType::Optional(_), Value::Null) => true,
            (FieldType::Optional(inner), other) => inner.accepts(other),
            (FieldType::Bool, Value::Bool(_)) => true,
            (FieldType::Int, Value::Int(_)) => true,
            (FieldType::Float, Value::Float(_)) => true,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::List, Value::List(_)) => true,
            (FieldType::Map, Value::Map(_)) => true,
            _ => false,
        }
    }

    /// Whether an `Int` can be widened into this type
    pub(crate) fn is_float(&self) -> bool {
        match self {
            FieldType::Float => true,
            FieldType::Optional(inner) => inner.is_float(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "bool"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::String => write!(f, "string"),
            FieldType::List => write!(f, "list"),
            FieldType::Map => write!(f, "map"),
            FieldType::Any => write!(f, "any"),
            FieldType::Optional(inner) => write!(f, "option<{}>", inner),
        }
    }
}

/// A single `(name, type)` entry of a record schema
///
/// A descriptor built with [`FieldDescriptor::of`] also checks values
/// against the Rust type of the field, so element types and integer ranges
/// are enforced at cast time. One built with [`FieldDescriptor::new`] checks
/// the declared [`FieldType`] only.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: FieldType,
    check: Option<fn(&Value) -> bool>,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            check: None,
        }
    }

    /// Descriptor for a field stored as `F`
    pub fn of<F: FieldValue>(name: &'static str) -> Self {
        Self {
            name,
            ty: F::field_type(),
            check: Some(converts::<F>),
        }
    }

    /// Whether `value` may be stored in this field
    pub fn accepts(&self, value: &Value) -> bool {
        self.ty.accepts(value) && self.check.map_or(true, |check| check(value))
    }
}

fn converts<F: FieldValue>(value: &Value) -> bool {
    F::from_value(value).is_some()
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish()
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

impl Eq for FieldDescriptor {}

/// Ordered field table of a record type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// Look up a field by payload name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Outcome of writing a value into a record slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assign {
    /// The value was written
    Applied,
    /// The record has no writable field with that name
    NoSlot,
    /// The field exists but cannot hold the value
    Mismatch {
        expected: FieldType,
        actual: ValueKind,
    },
}

impl Assign {
    /// Write `value` into `slot`, reporting a mismatch if it does not convert
    pub fn write<F: FieldValue>(slot: &mut F, value: &Value) -> Self {
        match F::from_value(value) {
            Some(converted) => {
                *slot = converted;
                Assign::Applied
            }
            None => Assign::Mismatch {
                expected: F::field_type(),
                actual: value.kind(),
            },
        }
    }
}

/// A record type that changesets can cast into
///
/// # Examples
///
/// ```rust
/// use exo_changeset::{Assign, FieldDescriptor, FieldValue, Params, Record, Schema, Value};
///
/// #[derive(Debug, Default)]
/// struct Tag {
///     label: String,
/// }
///
/// impl Record for Tag {
///     fn schema() -> Schema {
///         Schema::new(vec![FieldDescriptor::of::<String>("label")])
///     }
///
///     fn assign(&mut self, field: &str, value: &Value) -> Assign {
///         match field {
///             "label" => Assign::write(&mut self.label, value),
///             _ => Assign::NoSlot,
///         }
///     }
///
///     fn to_params(&self) -> Params {
///         let mut params = Params::new();
///         params.insert("label".to_string(), self.label.to_value());
///         params
///     }
/// }
///
/// assert_eq!(Tag::schema().len(), 1);
/// ```
pub trait Record {
    /// The ordered field table
    fn schema() -> Schema;

    /// Write a value into the named field
    fn assign(&mut self, field: &str, value: &Value) -> Assign;

    /// Every schema field of this instance as a payload map
    fn to_params(&self) -> Params;
}

/// A Rust type that can live in a record field
pub trait FieldValue: Sized {
    fn field_type() -> FieldType;

    fn from_value(value: &Value) -> Option<Self>;

    fn to_value(&self) -> Value;
}

impl FieldValue for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FieldValue for String {
    fn field_type() -> FieldType {
        FieldType::String
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

macro_rules! impl_field_value_int {
    ($($t:ty),*) => {
        $(
            impl FieldValue for $t {
                fn field_type() -> FieldType {
                    FieldType::Int
                }

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_i64().and_then(|i| <$t>::try_from(i).ok())
                }

                // Values above i64::MAX saturate
                fn to_value(&self) -> Value {
                    Value::Int(i64::try_from(*self).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

impl_field_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FieldValue for f64 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FieldValue for f32 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f as f32),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FieldValue for Value {
    fn field_type() -> FieldType {
        FieldType::Any
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn field_type() -> FieldType {
        FieldType::Optional(Box::new(T::field_type()))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::List
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

impl<T: FieldValue> FieldValue for BTreeMap<String, T> {
    fn field_type() -> FieldType {
        FieldType::Map
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k.clone(), v)))
                .collect(),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<T: FieldValue> FieldValue for HashMap<String, T> {
    fn field_type() -> FieldType {
        FieldType::Map
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k.clone(), v)))
                .collect(),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_accepts() {
        assert!(FieldType::String.accepts(&Value::from("x")));
        assert!(!FieldType::String.accepts(&Value::Int(1)));
        assert!(!FieldType::Float.accepts(&Value::Int(1)));
        assert!(FieldType::Any.accepts(&Value::Null));
    }

    #[test]
    fn test_optional_accepts_null_and_inner() {
        let ty = <Option<i64>>::field_type();
        assert!(ty.accepts(&Value::Null));
        assert!(ty.accepts(&Value::Int(3)));
        assert!(!ty.accepts(&Value::from("3")));
        assert_eq!(ty.to_string(), "option<int>");
    }

    #[test]
    fn test_int_from_value_is_range_checked() {
        assert_eq!(u8::from_value(&Value::Int(255)), Some(255));
        assert_eq!(u8::from_value(&Value::Int(256)), None);
        assert_eq!(u32::from_value(&Value::Int(-1)), None);
    }

    #[test]
    fn test_vec_from_value_requires_every_element() {
        let ok = Value::from(vec!["a", "b"]);
        let mixed = Value::List(vec![Value::from("a"), Value::Int(1)]);
        assert_eq!(
            Vec::<String>::from_value(&ok),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(Vec::<String>::from_value(&mixed), None);
    }

    #[test]
    fn test_assign_write_reports_mismatch() {
        let mut slot = String::new();
        assert_eq!(Assign::write(&mut slot, &Value::from("hi")), Assign::Applied);
        assert_eq!(slot, "hi");

        let outcome = Assign::write(&mut slot, &Value::Bool(true));
        assert_eq!(
            outcome,
            Assign::Mismatch {
                expected: FieldType::String,
                actual: ValueKind::Bool,
            }
        );
        assert_eq!(slot, "hi");
    }

    #[test]
    fn test_schema_lookup() {
        let schema = Schema::new(vec![
            FieldDescriptor::new("a", FieldType::String),
            FieldDescriptor::new("b", FieldType::Int),
        ]);
        assert!(schema.contains("b"));
        assert!(!schema.contains("c"));
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_typed_descriptor_checks_elements_and_range() {
        let tags = FieldDescriptor::of::<Vec<String>>("tags");
        assert!(tags.accepts(&Value::from(vec!["a", "b"])));
        assert!(!tags.accepts(&Value::from(vec![1, 2])));

        let small = FieldDescriptor::of::<u8>("small");
        assert!(small.accepts(&Value::Int(255)));
        assert!(!small.accepts(&Value::Int(300)));
        assert_eq!(small, FieldDescriptor::new("small", FieldType::Int));

        // An untyped descriptor only checks the declared shape
        assert!(FieldDescriptor::new("tags", FieldType::List).accepts(&Value::from(vec![1, 2])));
    }
}
