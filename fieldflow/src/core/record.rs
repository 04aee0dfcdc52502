//! Record type and its processing state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use super::value::FieldValue;

/// The processing state of a record.
///
/// `Complete`, `Dropped` and `Fatal` are terminal: once a record reaches one
/// of them, further `dispatch`/`resume` calls are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Record has not been dispatched yet.
    New,
    /// The engine is scanning the record's field specs.
    Dispatching,
    /// Waiting for the resume of one outstanding operation.
    Suspended,
    /// Every derived field has a value.
    Complete,
    /// Dropped by the `DropItem` failure policy.
    Dropped,
    /// A fatal error ended processing of this record.
    Fatal,
}

impl RecordState {
    /// Returns true for the absorbing states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Dropped | Self::Fatal)
    }
}

impl Default for RecordState {
    fn default() -> Self {
        Self::New
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Dispatching => write!(f, "dispatching"),
            Self::Suspended => write!(f, "suspended"),
            Self::Complete => write!(f, "complete"),
            Self::Dropped => write!(f, "dropped"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// A structured data unit flowing through the pipeline.
///
/// A record is a mapping of field name to value plus a reference (by name)
/// to its registered schema. The `id` is the record's identity across
/// suspension boundaries: the same logical record re-enters dispatch after
/// every resume. Records are mutated only by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Stable identity across suspension.
    pub id: Uuid,
    /// Name of the schema registered for this record type.
    pub schema: String,
    /// When the record entered the pipeline.
    pub created_at: DateTime<Utc>,
    state: RecordState,
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record for the given schema.
    #[must_use]
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            schema: schema.into(),
            created_at: Utc::now(),
            state: RecordState::New,
            fields: HashMap::new(),
        }
    }

    /// Adds a field value (builder style).
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the value of a field, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns true if the field is present (including explicit null).
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Sets a field value.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Removes every field not in `keep`, preserving the rest of the record.
    pub fn retain_fields(&mut self, keep: &std::collections::HashSet<String>) {
        self.fields.retain(|name, _| keep.contains(name));
    }

    /// Returns the current processing state.
    #[must_use]
    pub fn state(&self) -> RecordState {
        self.state
    }

    /// Transitions the record to a new state.
    ///
    /// Terminal states are absorbing: a transition out of one is ignored.
    pub fn transition(&mut self, state: RecordState) {
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
    }

    /// Returns true once the record is in a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns the number of populated fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the populated fields.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }
}
