//! Async harness connecting the engine to a caller-owned I/O layer.
//!
//! The engine itself is synchronous; the driver owns the event loop around
//! it. It drains an input channel of [`Message`]s, keeps every in-flight
//! operation in a `FuturesUnordered`, and resumes the engine as completions
//! arrive, in whatever order the I/O layer delivers them.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpSubmitter;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::error;
use uuid::Uuid;

use crate::core::{Message, Operation, OperationOutcome, Record};
use crate::engine::{DispatchOutcome, Engine};

/// The caller-owned I/O layer.
///
/// Implementations must produce exactly one outcome per operation. Retry,
/// backoff, timeout and cancellation all live behind this trait; the engine
/// sees only the final outcome.
#[async_trait]
pub trait OperationSubmitter: Send + Sync {
    /// Performs one operation and reports its terminal outcome.
    async fn submit(&self, operation: &Operation) -> OperationOutcome;
}

/// Counters reported when the input stream closes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DriverStats {
    /// Records received from upstream.
    pub records_in: u64,
    /// Completed records emitted downstream.
    pub records_out: u64,
    /// Records dropped by failure policy.
    pub records_dropped: u64,
    /// Records ended by a fatal error.
    pub records_failed: u64,
    /// Pass-through messages forwarded unchanged.
    pub pass_through: u64,
    /// Operations handed to the submitter.
    pub operations_submitted: u64,
}

/// Drives records from an input channel through the engine to completion.
pub struct Driver {
    engine: Engine,
    submitter: Arc<dyn OperationSubmitter>,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

type InFlight = FuturesUnordered<BoxFuture<'static, (Uuid, OperationOutcome)>>;

impl Driver {
    /// Creates a driver over an engine and a submitter.
    #[must_use]
    pub fn new(engine: Engine, submitter: Arc<dyn OperationSubmitter>) -> Self {
        Self { engine, submitter }
    }

    /// Runs until the input closes and every in-flight operation resolved.
    ///
    /// Completed records go to `records_out`; pass-through messages go to
    /// `pass_through_out` when one is provided and are discarded otherwise.
    /// A fatal error aborts the offending record only, never the stream.
    ///
    /// # Errors
    ///
    /// Only if a downstream channel closes while the driver still has
    /// output for it.
    pub async fn run(
        &self,
        mut input: mpsc::Receiver<Message>,
        records_out: mpsc::Sender<Record>,
        pass_through_out: Option<mpsc::Sender<serde_json::Value>>,
    ) -> anyhow::Result<DriverStats> {
        let mut stats = DriverStats::default();
        let mut in_flight: InFlight = FuturesUnordered::new();
        let mut input_open = true;

        while input_open || !in_flight.is_empty() {
            tokio::select! {
                message = input.recv(), if input_open => match message {
                    Some(Message::Record(record)) => {
                        stats.records_in += 1;
                        let record_id = record.id;
                        let was_live = !record.is_terminal();
                        match self.engine.dispatch(record) {
                            Ok(outcome) => {
                                if was_live
                                    && outcome.emitted.is_none()
                                    && outcome.pending.is_none()
                                {
                                    stats.records_dropped += 1;
                                }
                                self.settle(outcome, &mut in_flight, &mut stats, &records_out)
                                    .await?;
                            }
                            Err(e) => {
                                stats.records_failed += 1;
                                error!(record_id = %record_id, error = %e, "record failed fatally");
                            }
                        }
                    }
                    Some(Message::PassThrough(value)) => {
                        stats.pass_through += 1;
                        if let Some(out) = &pass_through_out {
                            out.send(value)
                                .await
                                .context("pass-through channel closed")?;
                        }
                    }
                    None => input_open = false,
                },
                Some((operation_id, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                    match self.engine.resume(operation_id, outcome) {
                        Ok(resumed) => {
                            if resumed.dropped {
                                stats.records_dropped += 1;
                            }
                            let outcome = DispatchOutcome {
                                emitted: resumed.emitted,
                                pending: resumed.pending,
                            };
                            self.settle(outcome, &mut in_flight, &mut stats, &records_out)
                                .await?;
                        }
                        Err(e) => {
                            stats.records_failed += 1;
                            error!(operation_id = %operation_id, error = %e, "resume failed fatally");
                        }
                    }
                }
            }
        }
        Ok(stats)
    }

    async fn settle(
        &self,
        outcome: DispatchOutcome,
        in_flight: &mut InFlight,
        stats: &mut DriverStats,
        records_out: &mpsc::Sender<Record>,
    ) -> anyhow::Result<()> {
        if let Some(record) = outcome.emitted {
            stats.records_out += 1;
            records_out
                .send(record)
                .await
                .context("record output channel closed")?;
        }
        if let Some(operation) = outcome.pending {
            stats.operations_submitted += 1;
            let submitter = Arc::clone(&self.submitter);
            in_flight.push(Box::pin(async move {
                let result = submitter.submit(&operation).await;
                (operation.id, result)
            }));
        }
        Ok(())
    }
}
