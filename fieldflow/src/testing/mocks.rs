//! Mock providers and submitters for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::core::{FieldValue, Operation, OperationOutcome, OperationResponse, Record};
use crate::driver::OperationSubmitter;
use crate::errors::{FieldflowError, TransformError};
use crate::provider::{default_continuation, Transform, TransformProvider};
use crate::schema::FieldSpec;

/// A provider that always returns the same value and records its calls.
#[derive(Debug)]
pub struct ValueProvider {
    value: FieldValue,
    call_count: Mutex<usize>,
}

impl ValueProvider {
    /// Creates a provider returning a fixed text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: FieldValue::text(value),
            call_count: Mutex::new(0),
        }
    }

    /// Returns how many times the provider was asked to resolve a field.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

impl TransformProvider for ValueProvider {
    fn resolve(&self, _spec: &FieldSpec, _record: &Record) -> Result<Transform, FieldflowError> {
        *self.call_count.lock() += 1;
        Ok(Transform::Value(self.value.clone()))
    }
}

/// A provider that always defers, using the default continuation.
#[derive(Debug)]
pub struct DeferringProvider {
    url: String,
}

impl DeferringProvider {
    /// Creates a deferring provider targeting a URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl TransformProvider for DeferringProvider {
    fn resolve(&self, spec: &FieldSpec, _record: &Record) -> Result<Transform, FieldflowError> {
        let operation = Operation::get(&self.url).with_query("field", &spec.name);
        Ok(Transform::Deferred(operation, default_continuation()))
    }
}

/// A provider that always raises a transform error.
#[derive(Debug)]
pub struct FailingProvider {
    message: String,
}

impl FailingProvider {
    /// Creates a failing provider with a fixed message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl TransformProvider for FailingProvider {
    fn resolve(&self, _spec: &FieldSpec, _record: &Record) -> Result<Transform, FieldflowError> {
        Err(FieldflowError::Transform(TransformError::new(
            self.message.clone(),
        )))
    }
}

/// A provider violating the contract by returning a bare operation.
#[derive(Debug)]
pub struct OrphaningProvider {
    url: String,
}

impl OrphaningProvider {
    /// Creates the violating provider.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl TransformProvider for OrphaningProvider {
    fn resolve(&self, _spec: &FieldSpec, _record: &Record) -> Result<Transform, FieldflowError> {
        Ok(Transform::Submit(Operation::get(&self.url)))
    }
}

/// A provider with a per-field script: direct values for some fields,
/// deferred operations for others.
#[derive(Debug, Default)]
pub struct RoutingProvider {
    values: HashMap<String, FieldValue>,
    deferred: HashMap<String, String>,
}

impl RoutingProvider {
    /// Creates an empty routing provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `field` synchronously to `value`.
    #[must_use]
    pub fn with_value(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.values.insert(field.into(), value);
        self
    }

    /// Defers `field` with an operation against `url`.
    #[must_use]
    pub fn with_deferred(mut self, field: impl Into<String>, url: impl Into<String>) -> Self {
        self.deferred.insert(field.into(), url.into());
        self
    }
}

impl TransformProvider for RoutingProvider {
    fn resolve(&self, spec: &FieldSpec, _record: &Record) -> Result<Transform, FieldflowError> {
        if let Some(value) = self.values.get(&spec.name) {
            return Ok(Transform::Value(value.clone()));
        }
        if let Some(url) = self.deferred.get(&spec.name) {
            let operation = Operation::get(url).with_query("field", &spec.name);
            return Ok(Transform::Deferred(operation, default_continuation()));
        }
        Err(FieldflowError::Transform(TransformError::new(format!(
            "no route for field '{}'",
            spec.name
        ))))
    }
}

/// A submitter that answers from a scripted queue of outcomes.
///
/// When the queue is empty it answers with a 200 response echoing the
/// operation's `field` query parameter.
#[derive(Debug, Default)]
pub struct ScriptedSubmitter {
    outcomes: Mutex<VecDeque<OperationOutcome>>,
    submitted: Mutex<Vec<Operation>>,
}

impl ScriptedSubmitter {
    /// Creates a submitter with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an outcome, builder style.
    #[must_use]
    pub fn with_outcome(self, outcome: OperationOutcome) -> Self {
        self.outcomes.lock().push_back(outcome);
        self
    }

    /// Queues an outcome.
    pub fn push(&self, outcome: OperationOutcome) {
        self.outcomes.lock().push_back(outcome);
    }

    /// Returns the operations submitted so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<Operation> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl OperationSubmitter for ScriptedSubmitter {
    async fn submit(&self, operation: &Operation) -> OperationOutcome {
        self.submitted.lock().push(operation.clone());
        if let Some(outcome) = self.outcomes.lock().pop_front() {
            return outcome;
        }
        let echo = operation
            .query
            .iter()
            .find(|(k, _)| k == "field")
            .map_or_else(String::new, |(_, v)| format!("echo:{v}"));
        OperationOutcome::Success(OperationResponse::ok(echo, &operation.url))
    }
}
