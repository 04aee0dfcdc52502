//! Core data types: records, field values, operations and stream messages.

mod message;
mod operation;
mod record;
mod value;

pub use message::Message;
pub use operation::{Operation, OperationOutcome, OperationResponse};
pub use record::{Record, RecordState};
pub use value::FieldValue;
