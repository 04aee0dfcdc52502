//! Asynchronous provider shaped around Google Cloud Translation v2.
//!
//! The provider never performs I/O itself: it describes the request as an
//! [`Operation`] and supplies a continuation that parses the API's JSON
//! response. Submission and completion belong to the caller's I/O layer.

use crate::config::Settings;
use crate::core::{FieldValue, Operation, Record};
use crate::errors::{FieldflowError, TransformError};
use crate::schema::FieldSpec;

use super::{source_language, Continuation, Transform, TransformProvider};

const TRANSLATE_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Asynchronous translation provider for the Google Cloud Translation API.
///
/// The API key is taken from an explicit override first, then from
/// [`Settings::google_api_key`]. A missing key surfaces as a configuration
/// error on the first resolve, not at construction, so wiring a provider up
/// in tests or demos without credentials stays cheap.
#[derive(Debug, Clone)]
pub struct GoogleTranslateProvider {
    settings: Settings,
    api_key: Option<String>,
}

impl GoogleTranslateProvider {
    /// Creates a provider reading its key from settings.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            api_key: None,
        }
    }

    /// Overrides the API key from settings.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn api_key(&self) -> Result<String, FieldflowError> {
        self.api_key
            .clone()
            .or_else(|| self.settings.google_api_key.clone())
            .ok_or_else(|| {
                FieldflowError::Configuration(
                    "a Google Cloud API key must be available: set it on the provider \
                     or via the google_api_key setting"
                        .to_string(),
                )
            })
    }

    fn parse_translation(body: &str) -> Result<FieldValue, TransformError> {
        let json: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| TransformError::new(format!("malformed translation response: {e}")))?;
        json.pointer("/data/translations/0/translatedText")
            .and_then(serde_json::Value::as_str)
            .map(FieldValue::text)
            .ok_or_else(|| {
                TransformError::new("translation response has no translatedText entry")
            })
    }
}

impl TransformProvider for GoogleTranslateProvider {
    fn resolve(&self, spec: &FieldSpec, record: &Record) -> Result<Transform, FieldflowError> {
        let key = self.api_key()?;
        let target = spec.target_language.as_deref().ok_or_else(|| {
            FieldflowError::Transform(TransformError::new(format!(
                "field '{}' has no target language",
                spec.name
            )))
        })?;
        let text = record
            .get(&spec.source_field)
            .and_then(FieldValue::as_text)
            .ok_or_else(|| {
                FieldflowError::Transform(TransformError::new(format!(
                    "source field '{}' has no text value",
                    spec.source_field
                )))
            })?;

        let operation = Operation::get(TRANSLATE_ENDPOINT)
            .with_query("key", key)
            .with_query("q", text)
            .with_query("target", target)
            .with_query("source", source_language(spec, &self.settings));

        let continuation: Continuation = Box::new(|response| {
            GoogleTranslateProvider::parse_translation(&response.body)
        });
        Ok(Transform::Deferred(operation, continuation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec() -> FieldSpec {
        FieldSpec::derived("name_zh", "name_en").with_target_language("zh-CN")
    }

    fn record() -> Record {
        Record::new("city").with_field("name_en", "Tokyo")
    }

    #[test]
    fn builds_operation_with_query() {
        let provider =
            GoogleTranslateProvider::new(Settings::new().with_default_language("en"))
                .with_api_key("k-123");
        let transform = provider.resolve(&spec(), &record()).unwrap();
        let Transform::Deferred(op, _) = transform else {
            panic!("expected a deferred transform");
        };
        assert_eq!(op.url, TRANSLATE_ENDPOINT);
        assert_eq!(
            op.query,
            vec![
                ("key".to_string(), "k-123".to_string()),
                ("q".to_string(), "Tokyo".to_string()),
                ("target".to_string(), "zh-CN".to_string()),
                ("source".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn missing_key_is_a_configuration_error_at_first_use() {
        let provider = GoogleTranslateProvider::new(Settings::new());
        let err = provider.resolve(&spec(), &record()).unwrap_err();
        assert!(matches!(err, FieldflowError::Configuration(_)));
        assert!(!err.is_policy_resolvable());
    }

    #[test]
    fn continuation_parses_translated_text() {
        let body = r#"{"data":{"translations":[{"translatedText":"东京"}]}}"#;
        assert_eq!(
            GoogleTranslateProvider::parse_translation(body).unwrap(),
            FieldValue::text("东京")
        );
    }

    #[test]
    fn continuation_rejects_malformed_body() {
        assert!(GoogleTranslateProvider::parse_translation("not json").is_err());
        assert!(GoogleTranslateProvider::parse_translation("{}").is_err());
    }
}
