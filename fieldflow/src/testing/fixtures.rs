//! Shared fixtures: a city schema and sample records.

use std::sync::Arc;

use crate::core::Record;
use crate::policy::FailurePolicy;
use crate::schema::{FieldSpec, SchemaRegistry};

/// Registers a small city schema with translated name and description
/// fields, mirroring a typical enrichment setup.
#[must_use]
pub fn city_registry() -> Arc<SchemaRegistry> {
    let registry = Arc::new(SchemaRegistry::new());
    #[allow(clippy::unwrap_used)]
    registry
        .register(
            "city",
            vec![
                FieldSpec::derived("name_zh", "name_en")
                    .with_target_language("zh-CN")
                    .on_failure(FailurePolicy::ReportInField),
                FieldSpec::derived("name_ja", "name_en")
                    .with_target_language("ja")
                    .on_failure(FailurePolicy::ReportInField),
                FieldSpec::derived("desc_zh", "desc_en")
                    .with_target_language("zh-CN")
                    .on_failure(FailurePolicy::CopySource),
            ],
        )
        .unwrap();
    registry
}

/// A Tokyo record with the source fields of [`city_registry`] populated.
#[must_use]
pub fn tokyo_record() -> Record {
    Record::new("city")
        .with_field("name_en", "Tokyo")
        .with_field("desc_en", "Capital of Japan")
}
