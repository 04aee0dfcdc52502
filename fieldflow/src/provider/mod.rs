//! Transform provider interface.
//!
//! A provider is the pluggable capability that computes one derived field.
//! It either returns a value directly (synchronous shape) or an operation
//! plus a continuation (asynchronous shape); the engine is written once
//! against this interface and is agnostic to the provider's shape.

mod dictionary;
mod google;

pub use dictionary::DictionaryProvider;
pub use google::GoogleTranslateProvider;

use std::fmt;

use crate::config::Settings;
use crate::core::{FieldValue, Operation, OperationResponse, Record};
use crate::errors::{FieldflowError, TransformError};
use crate::schema::FieldSpec;

/// Extracts a field value from the response of a completed operation.
///
/// Supplied by the provider together with the operation; consumed exactly
/// once when the operation resolves.
pub type Continuation =
    Box<dyn FnOnce(&OperationResponse) -> Result<FieldValue, TransformError> + Send + 'static>;

/// The result of asking a provider to resolve one derived field.
pub enum Transform {
    /// The field is complete; no I/O was needed.
    Value(FieldValue),
    /// Suspend the record: submit the operation, resume with the
    /// continuation once its outcome arrives.
    Deferred(Operation, Continuation),
    /// An operation with no continuation. This is a contract violation and
    /// the engine rejects it with a configuration error; forwarding it
    /// silently would orphan the record forever.
    Submit(Operation),
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Deferred(op, _) => f.debug_tuple("Deferred").field(op).finish(),
            Self::Submit(op) => f.debug_tuple("Submit").field(op).finish(),
        }
    }
}

/// Pluggable transform capability.
pub trait TransformProvider: Send + Sync {
    /// Resolves one derived field of a record.
    ///
    /// # Errors
    ///
    /// [`FieldflowError::Transform`] is a business failure and is resolved
    /// through the field's failure policy (unless the field is critical).
    /// Any other error variant, such as a missing credential reported as
    /// [`FieldflowError::Configuration`], is fatal for the record.
    fn resolve(&self, spec: &FieldSpec, record: &Record) -> Result<Transform, FieldflowError>;
}

/// The default continuation: the whole response body becomes the value.
///
/// Covers the single-responsibility case where the operation's endpoint
/// already answers with exactly the translated text.
#[must_use]
pub fn default_continuation() -> Continuation {
    Box::new(|response| Ok(FieldValue::text(response.body.clone())))
}

/// Resolves the source language for a spec.
///
/// Precedence: the spec's explicit `source_language`, then the settings'
/// `default_language`, then `"en"`.
#[must_use]
pub fn source_language(spec: &FieldSpec, settings: &Settings) -> String {
    spec.source_language
        .clone()
        .or_else(|| settings.default_language.clone())
        .unwrap_or_else(|| "en".to_string())
}
