//! End-to-end dispatch/resume tests against scripted providers.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::config::{EmissionMode, Settings};
use crate::core::{FieldValue, OperationOutcome, OperationResponse, Record};
use crate::errors::FieldflowError;
use crate::events::CollectingEventSink;
use crate::policy::{FailurePolicy, TRANSLATION_ERROR_SENTINEL};
use crate::provider::DictionaryProvider;
use crate::schema::{FieldSpec, SchemaRegistry};
use crate::testing::{DeferringProvider, FailingProvider, RoutingProvider, ValueProvider};

use super::Engine;

fn registry_with(specs: Vec<FieldSpec>) -> Arc<SchemaRegistry> {
    let registry = Arc::new(SchemaRegistry::new());
    registry.register("city", specs).unwrap();
    registry
}

fn name_zh_spec(policy: FailurePolicy) -> FieldSpec {
    FieldSpec::derived("name_zh", "name_en")
        .with_target_language("zh-CN")
        .on_failure(policy)
}

fn tokyo() -> Record {
    Record::new("city").with_field("name_en", "Tokyo")
}

#[test]
fn zero_derived_fields_passes_record_through() {
    let engine = Engine::new(registry_with(vec![]), Arc::new(ValueProvider::text("unused")));
    let record = tokyo();
    let id = record.id;

    let outcome = engine.dispatch(record).unwrap();
    let emitted = outcome.emitted.unwrap();
    assert!(outcome.pending.is_none());
    assert_eq!(emitted.id, id);
    assert_eq!(emitted.get("name_en"), Some(&FieldValue::text("Tokyo")));
    assert_eq!(engine.pending_count(), 0);
}

#[test]
fn all_sync_fields_complete_in_one_dispatch() {
    let provider = DictionaryProvider::new()
        .with_entry("Tokyo", "zh-CN", "东京")
        .with_entry("Tokyo", "ja", "東京");
    let registry = registry_with(vec![
        name_zh_spec(FailurePolicy::Raise),
        FieldSpec::derived("name_ja", "name_en").with_target_language("ja"),
    ]);
    let engine = Engine::new(registry, Arc::new(provider));

    let outcome = engine.dispatch(tokyo()).unwrap();
    let emitted = outcome.emitted.unwrap();
    assert!(outcome.pending.is_none());
    assert_eq!(emitted.get("name_zh"), Some(&FieldValue::text("东京")));
    assert_eq!(emitted.get("name_ja"), Some(&FieldValue::text("東京")));
    assert_eq!(engine.pending_count(), 0);
}

#[test]
fn async_field_suspends_then_completes_on_resume() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::Raise)]);
    let engine = Engine::new(registry, Arc::new(DeferringProvider::new("https://api.test")));

    let outcome = engine.dispatch(tokyo()).unwrap();
    assert!(outcome.emitted.is_none());
    let operation = outcome.pending.unwrap();
    assert_eq!(engine.pending_count(), 1);

    let resumed = engine
        .resume(
            operation.id,
            OperationOutcome::Success(OperationResponse::ok("东京", &operation.url)),
        )
        .unwrap();
    let emitted = resumed.emitted.unwrap();
    assert!(resumed.pending.is_none());
    assert!(!resumed.dropped);
    assert_eq!(emitted.get("name_zh"), Some(&FieldValue::text("东京")));
    assert_eq!(engine.pending_count(), 0);
}

#[test]
fn report_in_field_writes_sentinel_after_async_failure() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::ReportInField)]);
    let engine = Engine::new(registry, Arc::new(DeferringProvider::new("https://api.test")));

    let operation = engine.dispatch(tokyo()).unwrap().pending.unwrap();
    let resumed = engine
        .resume(operation.id, OperationOutcome::Failure("timed out".to_string()))
        .unwrap();

    let emitted = resumed.emitted.unwrap();
    assert_eq!(emitted.get("name_en"), Some(&FieldValue::text("Tokyo")));
    assert_eq!(
        emitted.get("name_zh"),
        Some(&FieldValue::text(TRANSLATION_ERROR_SENTINEL))
    );
}

#[test]
fn copy_source_copies_source_value_after_failure() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::CopySource)]);
    let engine = Engine::new(registry, Arc::new(DeferringProvider::new("https://api.test")));

    let operation = engine.dispatch(tokyo()).unwrap().pending.unwrap();
    let resumed = engine
        .resume(operation.id, OperationOutcome::Failure("boom".to_string()))
        .unwrap();

    let emitted = resumed.emitted.unwrap();
    assert_eq!(emitted.get("name_zh"), Some(&FieldValue::text("Tokyo")));
}

#[test]
fn drop_item_emits_nothing() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::DropItem)]);
    let sink = Arc::new(CollectingEventSink::new());
    let engine = Engine::new(registry, Arc::new(DeferringProvider::new("https://api.test")))
        .with_event_sink(sink.clone());

    let operation = engine.dispatch(tokyo()).unwrap().pending.unwrap();
    let resumed = engine
        .resume(operation.id, OperationOutcome::Failure("boom".to_string()))
        .unwrap();

    assert!(resumed.emitted.is_none());
    assert!(resumed.pending.is_none());
    assert!(resumed.dropped);
    assert!(sink.event_types().contains(&"record.dropped".to_string()));
}

#[test]
fn sync_then_async_fields_mix() {
    // a resolves synchronously, b needs one operation.
    let registry = registry_with(vec![
        FieldSpec::derived("a", "name_en"),
        FieldSpec::derived("b", "name_en"),
    ]);
    let provider = RoutingProvider::new()
        .with_value("a", FieldValue::text("X"))
        .with_deferred("b", "https://api.test/b");
    let engine = Engine::new(registry, Arc::new(provider));

    let outcome = engine.dispatch(tokyo()).unwrap();
    assert!(outcome.emitted.is_none());
    let operation = outcome.pending.unwrap();
    assert_eq!(engine.pending_count(), 1);

    let resumed = engine
        .resume(
            operation.id,
            OperationOutcome::Success(OperationResponse::ok("Y", "https://api.test/b")),
        )
        .unwrap();
    let emitted = resumed.emitted.unwrap();
    assert_eq!(emitted.get("a"), Some(&FieldValue::text("X")));
    assert_eq!(emitted.get("b"), Some(&FieldValue::text("Y")));
    assert_eq!(engine.pending_count(), 0);
}

#[test]
fn two_async_fields_submit_one_operation_at_a_time() {
    let registry = registry_with(vec![
        FieldSpec::derived("name_zh", "name_en").with_target_language("zh-CN"),
        FieldSpec::derived("name_ja", "name_en").with_target_language("ja"),
    ]);
    let engine = Engine::new(registry, Arc::new(DeferringProvider::new("https://api.test")));

    let first = engine.dispatch(tokyo()).unwrap().pending.unwrap();
    assert_eq!(engine.pending_count(), 1);

    let resumed = engine
        .resume(
            first.id,
            OperationOutcome::Success(OperationResponse::ok("东京", "https://api.test")),
        )
        .unwrap();
    // The second derived field suspends only after the first resume.
    let second = resumed.pending.unwrap();
    assert!(resumed.emitted.is_none());
    assert_ne!(first.id, second.id);

    let finished = engine
        .resume(
            second.id,
            OperationOutcome::Success(OperationResponse::ok("東京", "https://api.test")),
        )
        .unwrap();
    let emitted = finished.emitted.unwrap();
    assert_eq!(emitted.get("name_zh"), Some(&FieldValue::text("东京")));
    assert_eq!(emitted.get("name_ja"), Some(&FieldValue::text("東京")));
}

#[test]
fn non_success_status_goes_through_policy() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::SetEmpty)]);
    let engine = Engine::new(registry, Arc::new(DeferringProvider::new("https://api.test")));

    let operation = engine.dispatch(tokyo()).unwrap().pending.unwrap();
    let response = OperationResponse {
        status: 503,
        body: String::new(),
        url: "https://api.test".to_string(),
    };
    let resumed = engine
        .resume(operation.id, OperationOutcome::Success(response))
        .unwrap();
    assert_eq!(
        resumed.emitted.unwrap().get("name_zh"),
        Some(&FieldValue::text(""))
    );
}

#[test]
fn critical_field_failure_is_fatal() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::SetEmpty).critical()]);
    let engine = Engine::new(registry, Arc::new(DeferringProvider::new("https://api.test")));

    let operation = engine.dispatch(tokyo()).unwrap().pending.unwrap();
    let error = engine
        .resume(operation.id, OperationOutcome::Failure("boom".to_string()))
        .unwrap_err();
    assert!(matches!(error, FieldflowError::Transform(_)));
}

#[test]
fn critical_sync_failure_is_fatal_too() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::ReportInField).critical()]);
    let engine = Engine::new(registry, Arc::new(FailingProvider::new("no such entry")));

    let error = engine.dispatch(tokyo()).unwrap_err();
    assert!(matches!(error, FieldflowError::Transform(_)));
}

#[test]
fn sync_failure_on_non_critical_field_continues_scan() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::ReportInField)]);
    let engine = Engine::new(registry, Arc::new(FailingProvider::new("no such entry")));

    let outcome = engine.dispatch(tokyo()).unwrap();
    assert_eq!(
        outcome.emitted.unwrap().get("name_zh"),
        Some(&FieldValue::text(TRANSLATION_ERROR_SENTINEL))
    );
}

#[test]
fn bare_operation_is_a_configuration_error() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::ReportInField)]);
    let engine = Engine::new(
        registry,
        Arc::new(crate::testing::OrphaningProvider::new("https://api.test")),
    );

    let error = engine.dispatch(tokyo()).unwrap_err();
    assert!(matches!(error, FieldflowError::Configuration(_)));
}

#[test]
fn resume_with_unknown_operation_id_errors() {
    let registry = registry_with(vec![]);
    let engine = Engine::new(registry, Arc::new(ValueProvider::text("unused")));
    let error = engine
        .resume(
            uuid::Uuid::new_v4(),
            OperationOutcome::Failure("late".to_string()),
        )
        .unwrap_err();
    assert!(matches!(error, FieldflowError::UnknownOperation(_)));
}

#[test]
fn dispatch_on_terminal_record_is_a_no_op() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::ReportInField)]);
    let engine = Engine::new(registry, Arc::new(FailingProvider::new("boom")));

    let completed = engine.dispatch(tokyo()).unwrap().emitted.unwrap();
    assert!(completed.is_terminal());

    let again = engine.dispatch(completed).unwrap();
    assert!(again.emitted.is_none());
    assert!(again.pending.is_none());
    assert_eq!(engine.pending_count(), 0);
}

#[test]
fn resume_twice_for_one_operation_errors_without_emission() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::ReportInField)]);
    let engine = Engine::new(registry, Arc::new(DeferringProvider::new("https://api.test")));

    let operation = engine.dispatch(tokyo()).unwrap().pending.unwrap();
    engine
        .resume(
            operation.id,
            OperationOutcome::Success(OperationResponse::ok("东京", "u")),
        )
        .unwrap();

    // The pending entry was consumed exactly once; a duplicate completion
    // is rejected and produces nothing.
    let error = engine
        .resume(
            operation.id,
            OperationOutcome::Success(OperationResponse::ok("东京", "u")),
        )
        .unwrap_err();
    assert!(matches!(error, FieldflowError::UnknownOperation(_)));
}

#[test]
fn unregistered_schema_is_a_schema_violation() {
    let engine = Engine::new(
        Arc::new(SchemaRegistry::new()),
        Arc::new(ValueProvider::text("unused")),
    );
    let error = engine.dispatch(tokyo()).unwrap_err();
    assert!(matches!(error, FieldflowError::SchemaViolation(_)));
}

#[test]
fn single_field_emission_keeps_derived_and_source_fields_only() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::Raise)]);
    let provider = DictionaryProvider::new().with_entry("Tokyo", "zh-CN", "东京");
    let engine = Engine::new(registry, Arc::new(provider))
        .with_settings(Settings::new().with_emission_mode(EmissionMode::SingleField));

    let record = tokyo().with_field("population", "37M");
    let emitted = engine.dispatch(record).unwrap().emitted.unwrap();
    assert!(emitted.has("name_en"));
    assert!(emitted.has("name_zh"));
    assert!(!emitted.has("population"));
}

#[test]
fn engine_emits_lifecycle_events() {
    let registry = registry_with(vec![name_zh_spec(FailurePolicy::Raise)]);
    let sink = Arc::new(CollectingEventSink::new());
    let engine = Engine::new(registry, Arc::new(DeferringProvider::new("https://api.test")))
        .with_event_sink(sink.clone());

    let operation = engine.dispatch(tokyo()).unwrap().pending.unwrap();
    engine
        .resume(
            operation.id,
            OperationOutcome::Success(OperationResponse::ok("东京", "u")),
        )
        .unwrap();

    let types = sink.event_types();
    assert_eq!(
        types,
        vec![
            "operation.submitted".to_string(),
            "operation.resumed".to_string(),
            "field.resolved".to_string(),
            "record.completed".to_string(),
        ]
    );
}
