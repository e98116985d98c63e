//! Exo Changeset - typed cast-and-validate pipeline for untyped payloads
//!
//! This crate turns an untyped key/value payload (for example a decoded HTTP
//! body) into a typed record, collecting every validation failure on the way
//! instead of stopping at the first one.
//!
//! # Main Components
//!
//! - **Value**: closed tagged union for payload and change values
//! - **Schema**: static field table of a target record, generated by
//!   `#[derive(Record)]` or written by hand
//! - **Changeset**: cast, chain operations, and accumulated errors
//! - **Validators**: length, format, acceptance, membership and generic
//!   numeric comparisons
//! - **Apply**: materialize a valid changeset into a record
//!
//! # Example
//!
//! ```rust
//! use exo_changeset::{params, Changeset, Record};
//! use exo_changeset::validators::{GreaterThanOrEqual, Length};
//!
//! #[derive(Debug, Default, Record)]
//! struct Signup {
//!     username: String,
//!     age: u32,
//! }
//!
//! let changeset = Changeset::<Signup>::cast(params! { "username" => "jo", "age" => 12 })
//!     .validate_required(["username", "age"])
//!     .validate_change("username", Length::new(3, 20))
//!     .validate_change("age", GreaterThanOrEqual::new(13_u32));
//!
//! let errors = changeset.apply_new().unwrap_err();
//! let fields = errors.to_field_map();
//! assert_eq!(fields["username"], "username should be at least 3 characters");
//! assert_eq!(fields["age"], "age must be greater than or equal to 13, got 12");
//! ```
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

// Lets derive output name `::exo_changeset` from inside this crate
extern crate self as exo_changeset;

pub mod apply;
pub mod changeset;
pub mod config;
pub mod error;
pub mod schema;
pub mod validators;
pub mod value;

// Re-export main types for convenience
pub use apply::{apply_in_place, apply_new};
pub use changeset::Changeset;
pub use config::{ChangesetConfig, UnknownFields};
pub use error::{ChangesetErrors, Error, ErrorKind, FieldError, Result, Violation};
pub use schema::{Assign, FieldDescriptor, FieldType, FieldValue, Record, Schema};
pub use validators::Validator;
pub use value::{Params, Value, ValueKind};

#[cfg(feature = "derive")]
pub use exo_derive::Record;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
