//! Counting and history wrappers
//!
//! Instrumentation is best-effort: a failed counter bump or log append is
//! logged and dropped, and the wrapped operation's result always reaches the
//! caller unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::operation::{Operation, OperationId};
use crate::config::RecorderConfig;
use crate::error::Result;
use crate::store::KeyValueStore;

/// An operation with both counting and history recording applied
pub type Instrumented<O> = RecordHistory<CountCalls<O>>;

/// A type-erased operation, as produced by [`CallRecorder::compose`]
pub type BoxedOperation<I, O> = Box<dyn Operation<Input = I, Output = O>>;

/// Counts every invocation attempt of the wrapped operation
pub struct CountCalls<O> {
    inner: O,
    store: Arc<dyn KeyValueStore>,
    id: OperationId,
}

#[async_trait]
impl<O: Operation> Operation for CountCalls<O> {
    type Input = O::Input;
    type Output = O::Output;

    async fn call(&self, input: Self::Input) -> Result<Self::Output> {
        // Counted before delegating so failed attempts are included
        if let Err(err) = self.store.incr(&self.id.counter_key()).await {
            warn!(operation = %self.id, error = %err, "Failed to increment call counter");
        }

        self.inner.call(input).await
    }
}

/// Records the input and output of every completed call
pub struct RecordHistory<O> {
    inner: O,
    store: Arc<dyn KeyValueStore>,
    id: OperationId,
}

impl<O> RecordHistory<O> {
    fn serialize<T: Serialize>(&self, value: &T, what: &str) -> Option<String> {
        match serde_json::to_string(value) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(operation = %self.id, error = %err, "Failed to serialize call {}", what);
                None
            }
        }
    }

    /// Append `entry` to the log at `key`, returns whether it landed
    async fn append(&self, key: &str, entry: String, what: &str) -> bool {
        match self.store.rpush(key, entry.into_bytes()).await {
            Ok(_) => true,
            Err(err) => {
                warn!(operation = %self.id, error = %err, "Failed to append call {}", what);
                false
            }
        }
    }
}

#[async_trait]
impl<O: Operation> Operation for RecordHistory<O> {
    type Input = O::Input;
    type Output = O::Output;

    async fn call(&self, input: Self::Input) -> Result<Self::Output> {
        // The input is logged before the call runs: an input without a
        // matching output marks a call that never completed.
        let input_recorded = match self.serialize(&input, "input") {
            Some(entry) => self.append(&self.id.inputs_key(), entry, "input").await,
            None => false,
        };

        let output = match self.inner.call(input).await {
            Ok(output) => output,
            Err(err) => {
                debug!(operation = %self.id, error = %err, "Call failed, output not recorded");
                return Err(err);
            }
        };

        // Never log an output whose input is missing
        if input_recorded {
            if let Some(entry) = self.serialize(&output, "output") {
                self.append(&self.id.outputs_key(), entry, "output").await;
            }
        }

        Ok(output)
    }
}

/// Builds instrumented operations over a shared store.
///
/// The recorder owns no state of its own, so clones are interchangeable.
#[derive(Clone)]
pub struct CallRecorder {
    store: Arc<dyn KeyValueStore>,
}

impl CallRecorder {
    /// Create a recorder writing to `store`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Count invocations of `op` under `id`
    pub fn count_calls<O: Operation>(&self, op: O, id: impl Into<OperationId>) -> CountCalls<O> {
        CountCalls {
            inner: op,
            store: Arc::clone(&self.store),
            id: id.into(),
        }
    }

    /// Record the input/output history of `op` under `id`
    pub fn record_history<O: Operation>(
        &self,
        op: O,
        id: impl Into<OperationId>,
    ) -> RecordHistory<O> {
        RecordHistory {
            inner: op,
            store: Arc::clone(&self.store),
            id: id.into(),
        }
    }

    /// Count and record `op`: `record_history(count_calls(op))`
    pub fn instrument<O: Operation>(&self, op: O, id: impl Into<OperationId>) -> Instrumented<O> {
        let id = id.into();
        self.record_history(self.count_calls(op, id.clone()), id)
    }

    /// Apply the wrappers enabled in `config`
    pub fn compose<O>(
        &self,
        op: O,
        id: impl Into<OperationId>,
        config: &RecorderConfig,
    ) -> BoxedOperation<O::Input, O::Output>
    where
        O: Operation + 'static,
    {
        let id = id.into();
        match (config.count_calls, config.record_history) {
            (true, true) => Box::new(self.instrument(op, id)),
            (true, false) => Box::new(self.count_calls(op, id)),
            (false, true) => Box::new(self.record_history(op, id)),
            (false, false) => Box::new(op),
        }
    }
}
