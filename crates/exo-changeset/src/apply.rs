//! Materializing a changeset into a record
//!
//! An invalid changeset never touches its target. A valid one writes every
//! change through the record's slot accessor, in field-name order:
//! - a change with no slot is skipped, or rejected under
//!   [`UnknownFields::Reject`]
//! - a change the slot cannot hold aborts with an `ApplyTypeMismatch` error
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::changeset::{Changeset, ChangesetPayload};
use crate::config::UnknownFields;
use crate::error::{ChangesetErrors, ErrorKind, FieldError};
use crate::schema::{Assign, Record};

/// Apply a changeset to a fresh record
///
/// The base instance is the one the changeset was cast onto, a default
/// instance unless [`Changeset::cast_with`] supplied one.
pub fn apply_new<T: Record>(changeset: Changeset<T>) -> Result<T, ChangesetErrors> {
    let (mut record, payload) = changeset.into_parts();
    write_changes(&mut record, payload)?;
    Ok(record)
}

/// Apply a changeset to an existing record
///
/// Fields are not rolled back on failure: when an assignment aborts, the
/// changes written before it remain on `target`.
pub fn apply_in_place<T: Record>(
    target: &mut T,
    changeset: Changeset<T>,
) -> Result<(), ChangesetErrors> {
    let (_, payload) = changeset.into_parts();
    write_changes(target, payload)
}

fn write_changes<T: Record>(target: &mut T, payload: ChangesetPayload) -> Result<(), ChangesetErrors> {
    if !payload.is_valid {
        return Err(payload.into_errors());
    }

    let policy = payload.config.unknown_fields;
    let failure = payload.changes.iter().find_map(|(field, value)| {
        match target.assign(field, value) {
            Assign::Applied => None,
            Assign::NoSlot if policy == UnknownFields::Ignore => {
                log::debug!("Skipping change for '{}': no writable field on target", field);
                None
            }
            Assign::NoSlot => Some(FieldError::new(
                field.as_str(),
                ErrorKind::InvalidField,
                format!("{} has no writable field on the target", field),
            )),
            Assign::Mismatch { expected, .. } => {
                let error = FieldError::new(
                    field.as_str(),
                    ErrorKind::ApplyTypeMismatch,
                    format!("type mismatch: cannot assign {} to a field of type {}", value, expected),
                );
                log::warn!("Apply aborted on '{}': {}", field, error.message);
                Some(error)
            }
        }
    });

    match failure {
        Some(error) => Err(payload.fail(error)),
        None => Ok(()),
    }
}

impl<T: Record> Changeset<T> {
    /// Method form of [`apply_new`]
    pub fn apply_new(self) -> Result<T, ChangesetErrors> {
        apply_new(self)
    }

    /// Method form of [`apply_in_place`]
    pub fn apply_to(self, target: &mut T) -> Result<(), ChangesetErrors> {
        apply_in_place(target, self)
    }
}
