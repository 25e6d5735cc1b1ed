//! Key-value store abstraction
//!
//! This module defines the `KeyValueStore` trait the cache and its
//! instrumentation are written against. Anything that offers Redis-like
//! scalar and list primitives can back a [`Cache`](crate::cache::Cache):
//!
//! - In-memory mode (for testing and single-process use)
//! - A remote store behind a client (implemented outside this crate)
//!
//! Implementations must make `incr` and `rpush` atomic per key; the recorder
//! relies on that to never lose a count or interleave a partial log entry.

mod inmemory;
#[cfg(test)]
pub(crate) mod testing;

pub use inmemory::InMemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// The core key-value store trait
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set `key` to hold `value`, replacing whatever it held
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Get the scalar value at `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Atomically increment the integer at `key`, starting from 0 when absent
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Atomically append `value` to the list at `key`, returns the new length
    async fn rpush(&self, key: &str, value: Vec<u8>) -> Result<u64>;

    /// Inclusive range of the list at `key`; negative indices count from the end
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>>;

    /// Whether `key` holds any value
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete `key`, returns true if it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Remove every key
    async fn flush(&self) -> Result<()>;

    /// Health check - verify the store is reachable
    async fn health_check(&self) -> Result<()>;
}

/// A scalar value accepted by the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Text(String),
    Bytes(Vec<u8>),
    Integer(i64),
    Float(f64),
}

impl StoredValue {
    /// Raw representation written to the store.
    ///
    /// Numbers are kept in decimal text form so they can be read back by
    /// any textual decoder.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StoredValue::Text(text) => text.as_bytes().to_vec(),
            StoredValue::Bytes(bytes) => bytes.clone(),
            StoredValue::Integer(n) => n.to_string().into_bytes(),
            StoredValue::Float(x) => x.to_string().into_bytes(),
        }
    }
}

impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Text(text) => write!(f, "{:?}", text),
            StoredValue::Bytes(bytes) => write!(f, "b{:?}", String::from_utf8_lossy(bytes)),
            StoredValue::Integer(n) => write!(f, "{}", n),
            StoredValue::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for StoredValue {
    fn from(s: &str) -> Self {
        StoredValue::Text(s.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(s: String) -> Self {
        StoredValue::Text(s)
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(bytes: Vec<u8>) -> Self {
        StoredValue::Bytes(bytes)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(bytes: &[u8]) -> Self {
        StoredValue::Bytes(bytes.to_vec())
    }
}

impl From<i64> for StoredValue {
    fn from(n: i64) -> Self {
        StoredValue::Integer(n)
    }
}

impl From<i32> for StoredValue {
    fn from(n: i32) -> Self {
        StoredValue::Integer(i64::from(n))
    }
}

impl From<u32> for StoredValue {
    fn from(n: u32) -> Self {
        StoredValue::Integer(i64::from(n))
    }
}

impl From<f64> for StoredValue {
    fn from(x: f64) -> Self {
        StoredValue::Float(x)
    }
}
