//! Reconstructs call traces from the recorder's logs

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::REPLAY_SCHEMA_VERSION;
use super::record::{CallTrace, RecordedCall};
use crate::codec::{DecodeError, Decoder};
use crate::config::ReplayConfig;
use crate::error::{MnemeError, Result};
use crate::recorder::OperationId;
use crate::store::KeyValueStore;

/// Reads an operation's counter and logs back out of the store
#[derive(Clone)]
pub struct ReplayEngine {
    store: Arc<dyn KeyValueStore>,
    config: ReplayConfig,
}

impl ReplayEngine {
    /// Create an engine reading from `store`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, ReplayConfig::default())
    }

    /// Create an engine with custom config
    pub fn with_config(store: Arc<dyn KeyValueStore>, config: ReplayConfig) -> Self {
        Self { store, config }
    }

    /// Number of recorded invocation attempts of `operation`.
    ///
    /// A counter that is not a non-negative integer is a decode error.
    pub async fn call_count(&self, operation: &OperationId) -> Result<u64> {
        let raw = self.store.get(&operation.counter_key()).await?;
        match raw {
            None => Ok(0),
            Some(raw) => {
                let count = Decoder::Integer
                    .decode(Some(raw.as_slice()))?
                    .as_integer()
                    .unwrap_or_default();
                u64::try_from(count).map_err(|_| {
                    MnemeError::from(DecodeError::Format {
                        kind: Decoder::Integer,
                        value: count.to_string(),
                    })
                })
            }
        }
    }

    /// Rebuild the call trace of `operation`.
    ///
    /// Inputs and outputs are paired by position. When the logs disagree in
    /// length only the common prefix is returned and the remainder is counted
    /// in [`CallTrace::incomplete`].
    pub async fn replay(&self, operation: &OperationId) -> Result<CallTrace> {
        let call_count = self.call_count(operation).await?;
        if call_count == 0 {
            return Ok(CallTrace::empty(operation.clone()));
        }

        let inputs = self.store.lrange(&operation.inputs_key(), 0, -1).await?;
        let outputs = self.store.lrange(&operation.outputs_key(), 0, -1).await?;

        let incomplete = inputs.len().abs_diff(outputs.len());
        if incomplete > 0 {
            debug!(
                operation = %operation,
                inputs = inputs.len(),
                outputs = outputs.len(),
                "Torn history, replaying completed calls only"
            );
        }

        let mut calls: Vec<RecordedCall> = inputs
            .into_iter()
            .zip(outputs)
            .enumerate()
            .map(|(sequence, (input, output))| RecordedCall {
                sequence: sequence as u64,
                input: String::from_utf8_lossy(&input).into_owned(),
                output: String::from_utf8_lossy(&output).into_owned(),
            })
            .collect();

        if let Some(max_calls) = self.config.max_calls {
            if calls.len() > max_calls {
                calls.drain(..calls.len() - max_calls);
            }
        }

        debug!(operation = %operation, call_count, replayed = calls.len(), "Replayed calls");

        Ok(CallTrace {
            schema_version: REPLAY_SCHEMA_VERSION,
            operation: operation.clone(),
            call_count,
            calls,
            incomplete,
            replayed_at: Utc::now(),
        })
    }

    /// Rebuild and render the call trace of `operation`
    pub async fn render(&self, operation: &OperationId) -> Result<String> {
        Ok(self.replay(operation).await?.render())
    }
}
