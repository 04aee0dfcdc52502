//! Schema registry mapping record types to their ordered field specs.

use parking_lot::RwLock;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use crate::errors::FieldflowError;

use super::spec::FieldSpec;

fn language_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // BCP-47-ish: primary subtag plus optional region/script subtag.
        #[allow(clippy::unwrap_used)]
        Regex::new(r"^[a-z]{2,3}(-[A-Za-z]{2,4})?$").unwrap()
    })
}

/// Registry of derived-field declarations, one entry per record type.
///
/// Registration happens once per type, before processing starts; there is
/// no dynamic mutation afterwards. `fields_of` returns the specs in
/// declaration order, which is the engine's deterministic processing order
/// and the tie-break for which field is attempted next.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<Vec<FieldSpec>>>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the derived fields of a record type.
    ///
    /// # Errors
    ///
    /// Returns [`FieldflowError::SchemaViolation`] if the type is already
    /// registered, a spec has an empty source field, duplicates a field
    /// name, or carries a malformed language code.
    pub fn register(
        &self,
        record_type: impl Into<String>,
        specs: Vec<FieldSpec>,
    ) -> Result<(), FieldflowError> {
        let record_type = record_type.into();
        validate_specs(&record_type, &specs)?;

        let mut schemas = self.schemas.write();
        if schemas.contains_key(&record_type) {
            return Err(FieldflowError::SchemaViolation(format!(
                "record type '{record_type}' is already registered"
            )));
        }
        tracing::debug!(
            record_type = %record_type,
            derived_fields = specs.len(),
            "registered schema"
        );
        schemas.insert(record_type, Arc::new(specs));
        Ok(())
    }

    /// Returns the ordered field specs of a record type, if registered.
    #[must_use]
    pub fn fields_of(&self, record_type: &str) -> Option<Arc<Vec<FieldSpec>>> {
        self.schemas.read().get(record_type).cloned()
    }

    /// Returns true if the record type is registered.
    #[must_use]
    pub fn contains(&self, record_type: &str) -> bool {
        self.schemas.read().contains_key(record_type)
    }

    /// Returns the spec for one derived field of a record type.
    #[must_use]
    pub fn spec_of(&self, record_type: &str, field: &str) -> Option<FieldSpec> {
        self.fields_of(record_type)
            .and_then(|specs| specs.iter().find(|s| s.name == field).cloned())
    }
}

fn validate_specs(record_type: &str, specs: &[FieldSpec]) -> Result<(), FieldflowError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for spec in specs {
        if spec.source_field.is_empty() {
            return Err(FieldflowError::SchemaViolation(format!(
                "field '{}' of '{record_type}' has an empty source field",
                spec.name
            )));
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(FieldflowError::SchemaViolation(format!(
                "field '{}' of '{record_type}' is declared twice",
                spec.name
            )));
        }
        for language in [&spec.source_language, &spec.target_language]
            .into_iter()
            .flatten()
        {
            if !language_code_pattern().is_match(language) {
                return Err(FieldflowError::SchemaViolation(format!(
                    "field '{}' of '{record_type}' has a malformed language code '{language}'",
                    spec.name
                )));
            }
        }
    }
    Ok(())
}
