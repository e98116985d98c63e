//! Numeric comparison validators
//!
//! Each comparison is generic over a primitive [`Number`] bound. Values are
//! ordered against the bound without being narrowed into its type: an
//! integer bound accepts any integer value, so `300` is greater than a `u8`
//! bound of `10`, while an `f64` bound accepts both integers and floats.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::Validator;
use crate::error::FieldError;
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;

/// A primitive numeric type usable as a comparison bound
pub trait Number: Copy + PartialOrd + fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Name used in "is not a number" messages
    const NAME: &'static str;

    /// Whether `value` is a number this bound can be compared with
    fn accepts(value: &Value) -> bool;

    /// Order an accepted `value` against `bound`; `None` when unordered (NaN)
    fn order(value: &Value, bound: Self) -> Option<Ordering>;
}

macro_rules! impl_number_int {
    ($($t:ty),*) => {
        $(
            impl Number for $t {
                const NAME: &'static str = stringify!($t);

                fn accepts(value: &Value) -> bool {
                    value.as_i64().is_some()
                }

                // i128 holds every i64 value and every bound losslessly
                fn order(value: &Value, bound: Self) -> Option<Ordering> {
                    value.as_i64().map(|i| i128::from(i).cmp(&(bound as i128)))
                }
            }
        )*
    };
}

impl_number_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Number for f64 {
    const NAME: &'static str = "f64";

    fn accepts(value: &Value) -> bool {
        value.as_f64().is_some()
    }

    fn order(value: &Value, bound: Self) -> Option<Ordering> {
        value.as_f64().and_then(|f| f.partial_cmp(&bound))
    }
}

impl Number for f32 {
    const NAME: &'static str = "f32";

    fn accepts(value: &Value) -> bool {
        value.as_f64().is_some()
    }

    fn order(value: &Value, bound: Self) -> Option<Ordering> {
        value.as_f64().and_then(|f| (f as f32).partial_cmp(&bound))
    }
}

/// Shared body of the comparison validators
fn compare<N: Number>(
    field: &str,
    value: &Value,
    rule: &str,
    phrase: &str,
    bound: N,
    holds: fn(Option<Ordering>) -> bool,
) -> Result<(), FieldError> {
    if !N::accepts(value) {
        return Err(FieldError::rejected(
            field,
            format!("{} is not a number of type {}, got {}", field, N::NAME, value),
            FieldError::create_violation(rule, N::NAME, value.kind().to_string()),
        ));
    }

    if holds(N::order(value, bound)) {
        return Ok(());
    }

    Err(FieldError::rejected(
        field,
        format!("{} must be {} {}, got {}", field, phrase, bound, value),
        FieldError::create_violation(rule, format!("{} {}", phrase, bound), value.to_string()),
    ))
}

macro_rules! comparison_validator {
    ($(#[$doc:meta])* $name:ident, $bound:ident, $rule:literal, $phrase:literal, $holds:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name<N: Number> {
            pub $bound: N,
        }

        impl<N: Number> $name<N> {
            pub fn new($bound: N) -> Self {
                Self { $bound }
            }
        }

        impl<N: Number> Validator for $name<N> {
            fn validate(&self, field: &str, value: &Value) -> Result<(), FieldError> {
                compare(field, value, $rule, $phrase, self.$bound, $holds)
            }
        }
    };
}

comparison_validator!(
    /// Validates that a number is strictly less than `max`
    LessThan, max, "less_than", "less than", |o| o == Some(Ordering::Less)
);
comparison_validator!(
    /// Validates that a number is less than or equal to `max`
    LessThanOrEqual, max, "less_than_or_equal", "less than or equal to", |o| matches!(o, Some(Ordering::Less | Ordering::Equal))
);
comparison_validator!(
    /// Validates that a number is strictly greater than `min`
    GreaterThan, min, "greater_than", "greater than", |o| o == Some(Ordering::Greater)
);
comparison_validator!(
    /// Validates that a number is greater than or equal to `min`
    GreaterThanOrEqual, min, "greater_than_or_equal", "greater than or equal to", |o| matches!(o, Some(Ordering::Greater | Ordering::Equal))
);
comparison_validator!(
    /// Validates that a number equals `value`
    EqualTo, value, "equal_to", "equal to", |o| o == Some(Ordering::Equal)
);
comparison_validator!(
    /// Validates that a number differs from `value`
    NotEqualTo, value, "not_equal_to", "not equal to", |o| o != Some(Ordering::Equal)
);
