//! Error types for the fieldflow orchestrator.
//!
//! The taxonomy separates data errors, which are resolved per-field through
//! the configured [`FailurePolicy`](crate::policy::FailurePolicy), from
//! configuration and programming errors, which are always fatal for the
//! offending record.

use thiserror::Error;
use uuid::Uuid;

/// A business failure raised by a transform provider or continuation.
///
/// On a non-critical field this never surfaces beyond a warning log; the
/// engine resolves it through the field's failure policy. On a critical
/// field it is fatal for the record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transform error: {message}")]
pub struct TransformError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl TransformError {
    /// Creates a new transform error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The main error type for fieldflow operations.
#[derive(Debug, Error)]
pub enum FieldflowError {
    /// A provider or continuation raised a business failure on a critical
    /// field (non-critical failures are resolved by policy instead).
    #[error("{0}")]
    Transform(#[from] TransformError),

    /// An async operation completed with a non-success status code.
    #[error("operation completed with status {status} for '{url}'")]
    InvalidResponse {
        /// The HTTP-like status code reported by the I/O layer.
        status: u16,
        /// The operation URL, for diagnostics.
        url: String,
    },

    /// A missing credential or a provider contract violation.
    ///
    /// Always fatal: this indicates misconfiguration, not bad data.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `resume` was called for an operation with no matching pending entry.
    ///
    /// Defensive: under the single-outstanding-operation invariant this
    /// should not occur.
    #[error("no pending operation for id {0}")]
    UnknownOperation(Uuid),

    /// Schema registration was rejected (duplicate type, malformed spec).
    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

impl FieldflowError {
    /// Returns true if the error can be resolved through a failure policy.
    ///
    /// Only transform and invalid-response errors are data errors; the
    /// remaining variants are fatal regardless of policy.
    #[must_use]
    pub fn is_policy_resolvable(&self) -> bool {
        matches!(self, Self::Transform(_) | Self::InvalidResponse { .. })
    }
}
