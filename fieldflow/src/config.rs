//! Runtime settings injected into providers and the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which fields a completed record carries when emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionMode {
    /// Emit the full record (default).
    #[default]
    Cumulative,
    /// Emit only the derived fields and their source fields.
    SingleField,
}

/// Configuration bag for providers and the engine.
///
/// Providers receive settings at construction; a missing required credential
/// surfaces as a configuration error at first use, not at construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Fallback source language when a field spec omits one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    /// Google Cloud Translation API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    /// Shape of emitted records.
    #[serde(default)]
    pub emission_mode: EmissionMode,
    /// Free-form extra settings for custom providers.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Settings {
    /// Creates default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default source language.
    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    /// Sets the Google API key.
    #[must_use]
    pub fn with_google_api_key(mut self, key: impl Into<String>) -> Self {
        self.google_api_key = Some(key.into());
        self
    }

    /// Sets the emission mode.
    #[must_use]
    pub fn with_emission_mode(mut self, mode: EmissionMode) -> Self {
        self.emission_mode = mode;
        self
    }

    /// Adds an extra setting.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Looks up an extra setting.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_chains() {
        let settings = Settings::new()
            .with_default_language("en")
            .with_emission_mode(EmissionMode::SingleField)
            .with_extra("provider", serde_json::json!("google"));
        assert_eq!(settings.default_language.as_deref(), Some("en"));
        assert_eq!(settings.emission_mode, EmissionMode::SingleField);
        assert_eq!(settings.extra("provider"), Some(&serde_json::json!("google")));
    }

    #[test]
    fn emission_mode_serde_names() {
        let json = serde_json::to_value(EmissionMode::SingleField).unwrap();
        assert_eq!(json, serde_json::json!("single_field"));
    }
}
