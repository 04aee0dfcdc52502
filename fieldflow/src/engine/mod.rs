//! The orchestration engine.
//!
//! `dispatch` drives a record through its field specs until it either
//! completes or suspends on an operation; `resume` re-enters a suspended
//! record once the caller-owned I/O layer reports that operation's outcome.
//! The engine never blocks on I/O and holds no timer state.

mod pending;

#[cfg(test)]
mod integration_tests;

pub use pending::{PendingOperation, PendingStore};

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{EmissionMode, Settings};
use crate::core::{FieldValue, Operation, OperationOutcome, Record, RecordState};
use crate::errors::{FieldflowError, TransformError};
use crate::events::{EventSink, NoOpEventSink};
use crate::policy::{self, PolicyOutcome};
use crate::provider::{Transform, TransformProvider};
use crate::schema::{FieldSpec, SchemaRegistry};

/// Result of one `dispatch` call.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// The completed record, when no absent derived field remains.
    pub emitted: Option<Record>,
    /// The operation to submit, when the record suspended.
    pub pending: Option<Operation>,
}

/// Result of one `resume` call.
#[derive(Debug, Default)]
pub struct ResumeOutcome {
    /// The completed record, if the resume finished it.
    pub emitted: Option<Record>,
    /// A further operation, if the next derived field suspended too.
    pub pending: Option<Operation>,
    /// True if a failure policy dropped the record.
    pub dropped: bool,
}

/// Cooperative record-enrichment engine.
///
/// Single-threaded in spirit: each call runs synchronously to completion
/// and suspension points exist only between a `dispatch` returning an
/// operation and the matching `resume`. Records are fully independent, and
/// at most one operation is outstanding per record.
pub struct Engine {
    registry: Arc<SchemaRegistry>,
    provider: Arc<dyn TransformProvider>,
    settings: Settings,
    sink: Arc<dyn EventSink>,
    pending: PendingStore,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("pending", &self.pending.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine over a registry and a provider.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>, provider: Arc<dyn TransformProvider>) -> Self {
        Self {
            registry,
            provider,
            settings: Settings::default(),
            sink: Arc::new(NoOpEventSink),
            pending: PendingStore::new(),
        }
    }

    /// Sets the engine settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the number of outstanding operations across all records.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drives a record forward until it completes or suspends.
    ///
    /// Scans the record's field specs in declaration order. Synchronous
    /// values are drained eagerly within this one call; the first deferred
    /// transform suspends the record and returns its operation for
    /// submission. A terminal record is a no-op.
    ///
    /// # Errors
    ///
    /// Fatal errors (configuration, schema, critical-field failures) end
    /// processing of this record only.
    pub fn dispatch(&self, mut record: Record) -> Result<DispatchOutcome, FieldflowError> {
        if record.is_terminal() {
            debug!(record_id = %record.id, state = %record.state(), "dispatch on terminal record is a no-op");
            return Ok(DispatchOutcome::default());
        }
        let specs = self.registry.fields_of(&record.schema).ok_or_else(|| {
            FieldflowError::SchemaViolation(format!(
                "record type '{}' is not registered",
                record.schema
            ))
        })?;
        record.transition(RecordState::Dispatching);

        for spec in specs.iter() {
            if record.has(&spec.name) {
                continue;
            }
            match self.provider.resolve(spec, &record) {
                Ok(Transform::Value(value)) => {
                    debug!(record_id = %record.id, field = %spec.name, "field resolved synchronously");
                    self.emit_field_event("field.resolved", &record, &spec.name);
                    record.set(&spec.name, value);
                }
                Ok(Transform::Deferred(operation, continuation)) => {
                    record.transition(RecordState::Suspended);
                    let submitted = operation.clone();
                    self.sink.try_emit(
                        "operation.submitted",
                        Some(serde_json::json!({
                            "record_id": record.id,
                            "field": spec.name,
                            "operation_id": operation.id,
                            "url": operation.url,
                        })),
                    );
                    self.pending.insert(PendingOperation {
                        field: spec.name.clone(),
                        continuation,
                        operation,
                        record,
                    });
                    return Ok(DispatchOutcome {
                        emitted: None,
                        pending: Some(submitted),
                    });
                }
                Ok(Transform::Submit(operation)) => {
                    return Err(FieldflowError::Configuration(format!(
                        "transform for field '{}' returned operation {} without a \
                         continuation; the record would never complete",
                        spec.name, operation.id
                    )));
                }
                Err(error) if error.is_policy_resolvable() => {
                    match self.apply_failure(&mut record, spec, &error) {
                        FailureResolution::Continue => {}
                        FailureResolution::Dropped => return Ok(DispatchOutcome::default()),
                        FailureResolution::Fatal => return Err(error),
                    }
                }
                Err(error) => return Err(error),
            }
        }

        record.transition(RecordState::Complete);
        self.sink.try_emit(
            "record.completed",
            Some(serde_json::json!({"record_id": record.id, "schema": record.schema})),
        );
        Ok(DispatchOutcome {
            emitted: Some(self.shape_emission(record, &specs)),
            pending: None,
        })
    }

    /// Re-enters a suspended record with its operation's outcome.
    ///
    /// On success the continuation extracts the field value and the record
    /// is re-dispatched in the same call; on failure the field's policy
    /// decides between continuing, dropping and raising. Timeout, transport
    /// and status failures are treated uniformly.
    ///
    /// # Errors
    ///
    /// [`FieldflowError::UnknownOperation`] if no pending operation matches
    /// the id; otherwise fatal errors for this record only.
    pub fn resume(
        &self,
        operation_id: Uuid,
        outcome: OperationOutcome,
    ) -> Result<ResumeOutcome, FieldflowError> {
        let Some(pending) = self.pending.take(operation_id) else {
            return Err(FieldflowError::UnknownOperation(operation_id));
        };
        let PendingOperation {
            mut record,
            field,
            continuation,
            operation,
        } = pending;
        self.sink.try_emit(
            "operation.resumed",
            Some(serde_json::json!({
                "record_id": record.id,
                "field": field,
                "operation_id": operation_id,
                "url": operation.url,
            })),
        );

        let extracted: Result<FieldValue, FieldflowError> = match outcome {
            OperationOutcome::Success(response) if response.is_success() => {
                continuation(&response).map_err(FieldflowError::from)
            }
            OperationOutcome::Success(response) => Err(FieldflowError::InvalidResponse {
                status: response.status,
                url: response.url,
            }),
            OperationOutcome::Failure(message) => {
                Err(FieldflowError::Transform(TransformError::new(message)))
            }
        };

        match extracted {
            Ok(value) => {
                self.emit_field_event("field.resolved", &record, &field);
                record.set(&field, value);
                self.redispatch(record)
            }
            Err(error) => {
                let spec = self.registry.spec_of(&record.schema, &field).ok_or_else(|| {
                    FieldflowError::Configuration(format!(
                        "no field spec for resumed field '{field}' of '{}'",
                        record.schema
                    ))
                })?;
                match self.apply_failure(&mut record, &spec, &error) {
                    FailureResolution::Continue => self.redispatch(record),
                    FailureResolution::Dropped => Ok(ResumeOutcome {
                        emitted: None,
                        pending: None,
                        dropped: true,
                    }),
                    FailureResolution::Fatal => Err(error),
                }
            }
        }
    }

    fn redispatch(&self, record: Record) -> Result<ResumeOutcome, FieldflowError> {
        let outcome = self.dispatch(record)?;
        // The record was live entering dispatch, so producing neither an
        // emission nor an operation means a policy dropped it mid-scan.
        let dropped = outcome.emitted.is_none() && outcome.pending.is_none();
        Ok(ResumeOutcome {
            emitted: outcome.emitted,
            pending: outcome.pending,
            dropped,
        })
    }

    fn apply_failure(
        &self,
        record: &mut Record,
        spec: &FieldSpec,
        error: &FieldflowError,
    ) -> FailureResolution {
        warn!(
            record_id = %record.id,
            field = %spec.name,
            error = %error,
            "derived field failed"
        );
        self.emit_field_event("field.failed", record, &spec.name);
        match policy::resolve(spec, record) {
            PolicyOutcome::Continue(value) => {
                record.set(&spec.name, value);
                FailureResolution::Continue
            }
            PolicyOutcome::Drop => {
                record.transition(RecordState::Dropped);
                self.sink.try_emit(
                    "record.dropped",
                    Some(serde_json::json!({"record_id": record.id, "field": spec.name})),
                );
                FailureResolution::Dropped
            }
            PolicyOutcome::Raise => {
                record.transition(RecordState::Fatal);
                FailureResolution::Fatal
            }
        }
    }

    fn shape_emission(&self, mut record: Record, specs: &[FieldSpec]) -> Record {
        if self.settings.emission_mode == EmissionMode::SingleField {
            let keep: HashSet<String> = specs
                .iter()
                .flat_map(|s| [s.name.clone(), s.source_field.clone()])
                .collect();
            record.retain_fields(&keep);
        }
        record
    }

    fn emit_field_event(&self, event_type: &str, record: &Record, field: &str) {
        self.sink.try_emit(
            event_type,
            Some(serde_json::json!({"record_id": record.id, "field": field})),
        );
    }
}

enum FailureResolution {
    Continue,
    Dropped,
    Fatal,
}
