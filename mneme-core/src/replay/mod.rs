//! Replay of recorded operation calls
//!
//! This module reconstructs what an instrumented operation was asked to do
//! and what it answered, for:
//! - Debugging: see the exact arguments and results of past calls
//! - Auditing: compare the attempt counter with the completed history
//!
//! # Architecture
//!
//! The recorder leaves three values per operation in the store: a counter,
//! an input log and an output log. [`ReplayEngine`] reads them back and zips
//! the logs by position into a [`CallTrace`]. A crash between the two appends
//! leaves the logs torn; replay then shows the completed prefix only.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mneme_core::recorder::OperationId;
//! use mneme_core::replay::ReplayEngine;
//! use mneme_core::store::InMemoryStore;
//!
//! # async fn run() -> mneme_core::error::Result<()> {
//! let engine = ReplayEngine::new(Arc::new(InMemoryStore::new()));
//! let trace = engine.replay(&OperationId::new("Cache.store")).await?;
//! println!("{}", trace);
//! trace.save("cache_store.jsonl")?;
//! # Ok(())
//! # }
//! ```

mod engine;
mod record;

pub use engine::ReplayEngine;
pub use record::{CallTrace, RecordedCall};

/// Current schema version for saved traces
pub const REPLAY_SCHEMA_VERSION: u32 = 1;
