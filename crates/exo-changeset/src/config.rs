//! Cast and apply policy configuration
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};

/// What apply does with a change that has no slot on the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    /// Skip the change silently
    #[default]
    Ignore,
    /// Record an `InvalidField` error and fail
    Reject,
}

/// Configuration carried by a changeset from cast to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangesetConfig {
    /// Apply-time policy for changes without a target slot
    pub unknown_fields: UnknownFields,
    /// Accept integer values for float fields
    pub widen_integers: bool,
}

impl Default for ChangesetConfig {
    fn default() -> Self {
        Self::permissive()
    }
}

impl ChangesetConfig {
    /// Ignore slot-less changes, exact type matching
    pub fn permissive() -> Self {
        Self {
            unknown_fields: UnknownFields::Ignore,
            widen_integers: false,
        }
    }

    /// Reject slot-less changes at apply time, exact type matching
    pub fn strict() -> Self {
        Self {
            unknown_fields: UnknownFields::Reject,
            widen_integers: false,
        }
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Enable integer to float widening
    pub fn with_widen_integers(mut self) -> Self {
        self.widen_integers = true;
        self
    }
}
