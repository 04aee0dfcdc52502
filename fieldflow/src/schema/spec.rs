//! Derived-field declarations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::policy::FailurePolicy;

/// Static declaration of one derived field.
///
/// A spec names the field to populate, the field it is computed from, an
/// optional named transform (the provider's default translation transform
/// applies when absent), language parameters, and how failures are
/// resolved. Specs are declared once at schema registration; declaration
/// order is the engine's processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Name of the derived field.
    pub name: String,
    /// Field the value is computed from.
    pub source_field: String,
    /// Optional named transform understood by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    /// Language of the source field; falls back to the configured default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    /// Language to translate into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    /// Free-form provider parameters.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, serde_json::Value>,
    /// Failure resolution; `ReportInField` (with a warning) when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<FailurePolicy>,
    /// A critical field treats any failure as fatal, overriding the policy.
    #[serde(default)]
    pub critical: bool,
}

impl FieldSpec {
    /// Declares a derived field computed from `source_field`.
    #[must_use]
    pub fn derived(name: impl Into<String>, source_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_field: source_field.into(),
            transform: None,
            source_language: None,
            target_language: None,
            params: HashMap::new(),
            on_failure: None,
            critical: false,
        }
    }

    /// Sets the target language.
    #[must_use]
    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }

    /// Sets the source language explicitly.
    #[must_use]
    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = Some(language.into());
        self
    }

    /// Selects a named transform instead of the provider default.
    #[must_use]
    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        self.transform = Some(transform.into());
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = Some(policy);
        self
    }

    /// Marks the field critical.
    #[must_use]
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Adds a provider parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}
