//! Stream message type for the upstream interface.

use serde::{Deserialize, Serialize};

use super::record::Record;

/// One unit of upstream input.
///
/// The input sequence may interleave plain pass-through payloads with
/// records; pass-through messages are forwarded downstream unchanged and
/// never enter the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// A record to enrich.
    Record(Record),
    /// An opaque payload to forward unchanged.
    PassThrough(serde_json::Value),
}

impl From<Record> for Message {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<serde_json::Value> for Message {
    fn from(value: serde_json::Value) -> Self {
        Self::PassThrough(value)
    }
}
