//! In-memory store for testing and single-process deployments
//!
//! Values live in a HashMap guarded by a single lock. Each mutating call
//! takes the write lock exactly once, so `incr` and `rpush` are atomic with
//! respect to every other caller sharing the store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::{MnemeError, Result};

#[derive(Debug, Clone)]
enum Entry {
    Scalar(Vec<u8>),
    List(Vec<Vec<u8>>),
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Resolve a Redis-style inclusive `[start, stop]` range against `len`.
fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len {
        return None;
    }

    Some((start as usize, stop as usize))
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Entry::Scalar(value));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            None => Ok(None),
            Some(Entry::Scalar(value)) => Ok(Some(value.clone())),
            Some(Entry::List(_)) => Err(MnemeError::WrongType {
                key: key.to_string(),
            }),
        }
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.write().await;

        let current = match entries.get(key) {
            None => 0,
            Some(Entry::Scalar(value)) => std::str::from_utf8(value)
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .ok_or_else(|| MnemeError::NotAnInteger {
                    key: key.to_string(),
                })?,
            Some(Entry::List(_)) => {
                return Err(MnemeError::WrongType {
                    key: key.to_string(),
                });
            }
        };

        let next = current.checked_add(1).ok_or_else(|| MnemeError::NotAnInteger {
            key: key.to_string(),
        })?;
        entries.insert(key.to_string(), Entry::Scalar(next.to_string().into_bytes()));

        Ok(next)
    }

    async fn rpush(&self, key: &str, value: Vec<u8>) -> Result<u64> {
        let mut entries = self.entries.write().await;

        match entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(Vec::new()))
        {
            Entry::List(items) => {
                items.push(value);
                Ok(items.len() as u64)
            }
            Entry::Scalar(_) => Err(MnemeError::WrongType {
                key: key.to_string(),
            }),
        }
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        let entries = self.entries.read().await;

        match entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::List(items)) => Ok(resolve_range(items.len(), start, stop)
                .map(|(from, to)| items[from..=to].to_vec())
                .unwrap_or_default()),
            Some(Entry::Scalar(_)) => Err(MnemeError::WrongType {
                key: key.to_string(),
            }),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(entries.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some())
    }

    async fn flush(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.clear();
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        // In-memory store is always reachable
        Ok(())
    }
}
