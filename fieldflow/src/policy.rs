//! Failure policies for derived fields.
//!
//! When an async operation fails, or a provider raises a transform error on
//! a non-critical field, the field's policy decides whether the record
//! continues, is dropped, or fails fatally. Resolution is a pure lookup; it
//! reads the record but never mutates it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::core::{FieldValue, Record};
use crate::schema::FieldSpec;

/// Sentinel value written by [`FailurePolicy::ReportInField`].
pub const TRANSLATION_ERROR_SENTINEL: &str = "--- translation error ---";

/// How a failed derived field is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Propagate the failure; fatal for the record.
    Raise,
    /// Drop the whole record, no further emission.
    DropItem,
    /// Write a sentinel error string into the field and continue.
    ReportInField,
    /// Copy the source field's current value and continue.
    CopySource,
    /// Set the field to explicit null and continue.
    SetNull,
    /// Set the field to the empty string and continue.
    SetEmpty,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raise => write!(f, "raise"),
            Self::DropItem => write!(f, "drop_item"),
            Self::ReportInField => write!(f, "report_in_field"),
            Self::CopySource => write!(f, "copy_source"),
            Self::SetNull => write!(f, "set_null"),
            Self::SetEmpty => write!(f, "set_empty"),
        }
    }
}

/// The decision produced by policy resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOutcome {
    /// Set the field to this value and keep dispatching the record.
    Continue(FieldValue),
    /// Drop the record.
    Drop,
    /// The failure is fatal and propagates to the caller.
    Raise,
}

/// Resolves a failure on `spec` against the record's current contents.
///
/// A critical field treats any failure as `Raise` regardless of the
/// configured policy. A spec without a policy defaults to `ReportInField`,
/// with a warning, so failures are never silently dropped.
#[must_use]
pub fn resolve(spec: &FieldSpec, record: &Record) -> PolicyOutcome {
    if spec.critical {
        return PolicyOutcome::Raise;
    }

    let policy = spec.on_failure.unwrap_or_else(|| {
        warn!(
            field = %spec.name,
            "no failure policy configured, defaulting to report_in_field"
        );
        FailurePolicy::ReportInField
    });

    match policy {
        FailurePolicy::Raise => PolicyOutcome::Raise,
        FailurePolicy::DropItem => PolicyOutcome::Drop,
        FailurePolicy::ReportInField => {
            PolicyOutcome::Continue(FieldValue::text(TRANSLATION_ERROR_SENTINEL))
        }
        FailurePolicy::CopySource => match record.get(&spec.source_field) {
            Some(value) => PolicyOutcome::Continue(value.clone()),
            None => {
                warn!(
                    field = %spec.name,
                    source_field = %spec.source_field,
                    "copy_source with absent source field, setting null"
                );
                PolicyOutcome::Continue(FieldValue::Null)
            }
        },
        FailurePolicy::SetNull => PolicyOutcome::Continue(FieldValue::Null),
        FailurePolicy::SetEmpty => PolicyOutcome::Continue(FieldValue::text("")),
    }
}
