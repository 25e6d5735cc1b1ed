//! Fault-injecting store for tests

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{InMemoryStore, KeyValueStore};
use crate::error::{MnemeError, Result};

/// Wraps an [`InMemoryStore`] and fails selected calls on demand
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryStore,
    unavailable: AtomicBool,
    failing_incr: AtomicBool,
    failing_set: AtomicBool,
    failing_lists: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call as if the store were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail every `incr`
    pub fn fail_incr(&self, fail: bool) {
        self.failing_incr.store(fail, Ordering::SeqCst);
    }

    /// Fail every `set`
    pub fn fail_set(&self, fail: bool) {
        self.failing_set.store(fail, Ordering::SeqCst);
    }

    /// Fail `rpush` on `key`
    pub fn fail_rpush_on(&self, key: impl Into<String>) {
        self.failing_lists.lock().unwrap().insert(key.into());
    }

    /// Let `rpush` on `key` succeed again
    pub fn heal_rpush_on(&self, key: &str) {
        self.failing_lists.lock().unwrap().remove(key);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MnemeError::StoreUnavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.check_available()?;
        if self.failing_set.load(Ordering::SeqCst) {
            return Err(MnemeError::StoreUnavailable("set rejected".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.check_available()?;
        self.inner.get(key).await
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.check_available()?;
        if self.failing_incr.load(Ordering::SeqCst) {
            return Err(MnemeError::StoreUnavailable("incr rejected".to_string()));
        }
        self.inner.incr(key).await
    }

    async fn rpush(&self, key: &str, value: Vec<u8>) -> Result<u64> {
        self.check_available()?;
        let failing = self.failing_lists.lock().unwrap().contains(key);
        if failing {
            return Err(MnemeError::StoreUnavailable(format!("rpush on {} rejected", key)));
        }
        self.inner.rpush(key, value).await
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        self.check_available()?;
        self.inner.lrange(key, start, stop).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.check_available()?;
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.check_available()?;
        self.inner.delete(key).await
    }

    async fn flush(&self) -> Result<()> {
        self.check_available()?;
        self.inner.flush().await
    }

    async fn health_check(&self) -> Result<()> {
        self.check_available()
    }
}
