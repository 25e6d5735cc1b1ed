//! The cache facade
//!
//! [`Cache`] stores scalar values under freshly generated keys and reads them
//! back through a [`Decoder`]. Its `store` operation is instrumented: every
//! call is counted and its argument and returned key are recorded under the
//! `Cache.store` identity.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::codec::{Decoded, Decoder};
use crate::config::MnemeConfig;
use crate::error::Result;
use crate::recorder::{CallRecorder, Operation, OperationId};
use crate::replay::{CallTrace, ReplayEngine};
use crate::store::{InMemoryStore, KeyValueStore, StoredValue};

/// Identity under which `Cache::store` is recorded
pub const STORE_OPERATION: &str = "Cache.store";

/// Writes a value under a new random key
struct StoreValue {
    store: Arc<dyn KeyValueStore>,
}

#[async_trait]
impl Operation for StoreValue {
    type Input = StoredValue;
    type Output = String;

    async fn call(&self, value: StoredValue) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        self.store.set(&key, value.to_bytes()).await?;
        debug!(key = %key, value = %value, "Stored value");
        Ok(key)
    }
}

/// Instrumented cache over a key-value store
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    store_op: Arc<dyn Operation<Input = StoredValue, Output = String>>,
    replay: ReplayEngine,
}

impl Cache {
    /// Create a cache over `store` with default configuration.
    ///
    /// Like every constructor, this flushes the store unless
    /// `store.flush_on_start` is disabled.
    pub async fn new(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Self::with_config(store, &MnemeConfig::default()).await
    }

    /// Create a cache over `store` with custom config
    pub async fn with_config(store: Arc<dyn KeyValueStore>, config: &MnemeConfig) -> Result<Self> {
        if config.store.flush_on_start {
            store.flush().await?;
            info!("Flushed store on cache start");
        } else {
            store.health_check().await?;
        }

        let recorder = CallRecorder::new(Arc::clone(&store));
        let store_op = recorder.compose(
            StoreValue {
                store: Arc::clone(&store),
            },
            STORE_OPERATION,
            &config.recorder,
        );
        let replay = ReplayEngine::with_config(Arc::clone(&store), config.replay.clone());

        Ok(Self {
            store,
            store_op: Arc::from(store_op),
            replay,
        })
    }

    /// Create a cache over a fresh in-memory store
    pub async fn from_config(config: &MnemeConfig) -> Result<Self> {
        Self::with_config(Arc::new(InMemoryStore::new()), config).await
    }

    /// Store `value` under a new key and return the key.
    ///
    /// A call that fails after its input was recorded leaves that input
    /// without an output. Replay pairs entries by position, so every later
    /// call in the trace shows the input of the call before it.
    pub async fn store(&self, value: impl Into<StoredValue>) -> Result<String> {
        self.store_op.call(value.into()).await
    }

    /// Read the value at `key` and decode it.
    ///
    /// Returns `Ok(None)` for an absent key without invoking the decoder.
    pub async fn retrieve(&self, key: &str, decoder: Decoder) -> Result<Option<Decoded>> {
        let Some(raw) = self.store.get(key).await? else {
            debug!(key = %key, "Key not found");
            return Ok(None);
        };

        Ok(Some(decoder.decode(Some(raw.as_slice()))?))
    }

    /// Read the stored bytes at `key`
    pub async fn retrieve_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .retrieve(key, Decoder::Raw)
            .await?
            .and_then(Decoded::into_bytes))
    }

    /// Read the value at `key` as UTF-8 text
    pub async fn retrieve_as_text(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .retrieve(key, Decoder::Text)
            .await?
            .and_then(Decoded::into_text))
    }

    /// Read the value at `key` as an integer
    pub async fn retrieve_as_integer(&self, key: &str) -> Result<Option<i64>> {
        Ok(self
            .retrieve(key, Decoder::Integer)
            .await?
            .and_then(|decoded| decoded.as_integer()))
    }

    /// Read the value at `key` as a float
    pub async fn retrieve_as_float(&self, key: &str) -> Result<Option<f64>> {
        Ok(self
            .retrieve(key, Decoder::Float)
            .await?
            .and_then(|decoded| decoded.as_float()))
    }

    /// Call trace of `store`
    pub async fn replay(&self) -> Result<CallTrace> {
        self.replay.replay(&OperationId::new(STORE_OPERATION)).await
    }

    /// Engine for replaying any operation recorded in this cache's store
    pub fn replay_engine(&self) -> &ReplayEngine {
        &self.replay
    }

    /// The underlying store
    pub fn store_handle(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }
}
