//! # Mneme - An Instrumented Cache
//!
//! Mneme (Μνήμη) is a thin layer over a key-value store that:
//! - Stores scalar values under freshly generated keys
//! - Reads them back through named decoders
//! - Counts and records the calls of instrumented operations
//! - Replays that record as an ordered, human-readable call trace
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mneme_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let cache = Cache::from_config(&MnemeConfig::default()).await?;
//!
//!     let key = cache.store("foo").await?;
//!     assert_eq!(cache.retrieve_as_text(&key).await?, Some("foo".to_string()));
//!
//!     println!("{}", cache.replay().await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Store**: the [`KeyValueStore`](store::KeyValueStore) trait and an in-memory implementation
//! - **Codec**: the closed set of [`Decoder`](codec::Decoder)s applied at read time
//! - **Recorder**: composable counting and history wrappers around an [`Operation`](recorder::Operation)
//! - **Replay**: rebuilds a [`CallTrace`](replay::CallTrace) from the recorded logs
//! - **Cache**: the facade whose `store` operation is instrumented

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod recorder;
pub mod replay;
pub mod store;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{Cache, STORE_OPERATION};
    pub use crate::codec::{DecodeError, Decoded, Decoder};
    pub use crate::config::{ConfigBuilder, MnemeConfig, RecorderConfig, ReplayConfig, StoreConfig};
    pub use crate::error::{MnemeError, Result};
    pub use crate::recorder::{
        BoxedOperation, CallRecorder, CountCalls, FnOperation, Instrumented, Operation,
        OperationId, RecordHistory,
    };
    pub use crate::replay::{CallTrace, RecordedCall, ReplayEngine};
    pub use crate::store::{InMemoryStore, KeyValueStore, StoredValue};
}
