//! Correlation store for in-flight operations.

use dashmap::DashMap;
use std::fmt;
use uuid::Uuid;

use crate::core::{Operation, Record};
use crate::provider::Continuation;

/// Correlates one in-flight operation with the record and field awaiting it.
///
/// Created when a dispatch suspends, consumed exactly once when the
/// operation resolves, and never shared across records: the store owns the
/// record snapshot while it is suspended.
pub struct PendingOperation {
    /// The suspended record.
    pub record: Record,
    /// Name of the field the operation resolves.
    pub field: String,
    /// Extracts the field value from the operation's response.
    pub continuation: Continuation,
    /// The originating operation descriptor.
    pub operation: Operation,
}

impl fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingOperation")
            .field("record_id", &self.record.id)
            .field("field", &self.field)
            .field("operation_id", &self.operation.id)
            .finish_non_exhaustive()
    }
}

/// Concurrent map of outstanding operations keyed by operation id.
#[derive(Debug, Default)]
pub struct PendingStore {
    inner: DashMap<Uuid, PendingOperation>,
}

impl PendingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a pending operation under its operation id.
    pub fn insert(&self, pending: PendingOperation) {
        self.inner.insert(pending.operation.id, pending);
    }

    /// Removes and returns the pending operation for an id.
    #[must_use]
    pub fn take(&self, operation_id: Uuid) -> Option<PendingOperation> {
        self.inner.remove(&operation_id).map(|(_, pending)| pending)
    }

    /// Returns the number of outstanding operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no operation is outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
