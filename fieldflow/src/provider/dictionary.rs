//! Synchronous provider backed by an in-memory translation table.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::core::{FieldValue, Record};
use crate::errors::{FieldflowError, TransformError};
use crate::schema::FieldSpec;

use super::{Transform, TransformProvider};

/// A synchronous provider that looks translations up in a fixed table.
///
/// Entries are keyed by `(source text, target language)`. A missing entry
/// or a missing target language is a transform error, which makes this
/// provider convenient for exercising failure policies.
#[derive(Debug, Default)]
pub struct DictionaryProvider {
    entries: RwLock<HashMap<(String, String), String>>,
}

impl DictionaryProvider {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a translation entry (builder style).
    #[must_use]
    pub fn with_entry(
        self,
        text: impl Into<String>,
        target_language: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        self.entries
            .write()
            .insert((text.into(), target_language.into()), translation.into());
        self
    }

    /// Adds a translation entry.
    pub fn insert(
        &self,
        text: impl Into<String>,
        target_language: impl Into<String>,
        translation: impl Into<String>,
    ) {
        self.entries
            .write()
            .insert((text.into(), target_language.into()), translation.into());
    }

    fn lookup(&self, text: &str, language: &str) -> Result<String, TransformError> {
        self.entries
            .read()
            .get(&(text.to_string(), language.to_string()))
            .cloned()
            .ok_or_else(|| {
                TransformError::new(format!("no '{language}' entry for '{text}'"))
            })
    }
}

impl TransformProvider for DictionaryProvider {
    fn resolve(&self, spec: &FieldSpec, record: &Record) -> Result<Transform, FieldflowError> {
        let language = spec.target_language.as_deref().ok_or_else(|| {
            FieldflowError::Transform(TransformError::new(format!(
                "field '{}' has no target language",
                spec.name
            )))
        })?;
        let source = record.get(&spec.source_field).ok_or_else(|| {
            FieldflowError::Transform(TransformError::new(format!(
                "source field '{}' is absent",
                spec.source_field
            )))
        })?;

        let value = match source {
            FieldValue::Text(text) => FieldValue::Text(self.lookup(text, language)?),
            FieldValue::List(items) => FieldValue::List(
                items
                    .iter()
                    .map(|text| self.lookup(text, language))
                    .collect::<Result<_, _>>()?,
            ),
            FieldValue::Null => {
                return Err(FieldflowError::Transform(TransformError::new(format!(
                    "source field '{}' is null",
                    spec.source_field
                ))))
            }
        };
        Ok(Transform::Value(value))
    }
}
