//! # Fieldflow
//!
//! A record-enrichment orchestrator: schemas declare *derived* fields that
//! are computed from other fields, providers transform them, and a
//! cooperative engine drives every record to a terminal state.
//!
//! A transform either completes synchronously or needs an outbound network
//! operation. In the async case the engine suspends the record, hands the
//! operation to a caller-owned I/O layer, and resumes when that operation's
//! outcome arrives:
//!
//! - **Schema registry**: ordered per-record-type field declarations
//! - **Providers**: one interface, sync and async shapes
//! - **Engine**: `dispatch`/`resume` state machine, never blocks on I/O
//! - **Failure policies**: per-field resolution when a transform fails
//! - **Driver**: tokio event loop wiring the engine to a submitter
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use fieldflow::prelude::*;
//!
//! let registry = Arc::new(SchemaRegistry::new());
//! registry.register("city", vec![
//!     FieldSpec::derived("name_zh", "name_en")
//!         .with_target_language("zh-CN")
//!         .on_failure(FailurePolicy::ReportInField),
//! ])?;
//!
//! let engine = Engine::new(registry, Arc::new(provider));
//! match engine.dispatch(record)? {
//!     outcome if outcome.pending.is_some() => { /* submit, resume later */ }
//!     outcome => { /* completed record in outcome.emitted */ }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod events;
pub mod observability;
pub mod policy;
pub mod provider;
pub mod schema;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{EmissionMode, Settings};
    pub use crate::core::{
        FieldValue, Message, Operation, OperationOutcome, OperationResponse, Record, RecordState,
    };
    pub use crate::driver::{Driver, DriverStats, OperationSubmitter};
    pub use crate::engine::{DispatchOutcome, Engine, ResumeOutcome};
    pub use crate::errors::{FieldflowError, TransformError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::policy::{FailurePolicy, PolicyOutcome, TRANSLATION_ERROR_SENTINEL};
    pub use crate::provider::{
        Continuation, DictionaryProvider, GoogleTranslateProvider, Transform, TransformProvider,
    };
    pub use crate::schema::{FieldSpec, SchemaRegistry};
}
