//! Call recording for instrumented operations
//!
//! An operation is a first-class value implementing [`Operation`]. The
//! recorder composes wrappers around it:
//!
//! - [`CountCalls`] bumps a per-operation counter once per attempt
//! - [`RecordHistory`] appends the call's input before delegating and its
//!   output after a successful return
//!
//! All state lives in the [`KeyValueStore`](crate::store::KeyValueStore)
//! under keys derived from an [`OperationId`]; the wrappers hold nothing but
//! a handle to the store.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mneme_core::recorder::{CallRecorder, FnOperation, Operation, OperationId};
//! use mneme_core::error::MnemeError;
//! use mneme_core::store::InMemoryStore;
//!
//! # async fn run() -> mneme_core::error::Result<()> {
//! let recorder = CallRecorder::new(Arc::new(InMemoryStore::new()));
//! let double = recorder.instrument(
//!     FnOperation::new(|n: i64| async move { Ok::<_, MnemeError>(n * 2) }),
//!     OperationId::new("math.double"),
//! );
//!
//! assert_eq!(double.call(21).await?, 42);
//! # Ok(())
//! # }
//! ```

mod operation;
mod wrap;

pub use operation::{FnOperation, Operation, OperationId};
pub use wrap::{BoxedOperation, CallRecorder, CountCalls, Instrumented, RecordHistory};
