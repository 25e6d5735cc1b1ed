//! Operations and their identities

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Stable name of an instrumented operation, e.g. `Cache.store`.
///
/// The identity is the root of the three store keys holding the operation's
/// counter, input log and output log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the call counter
    pub fn counter_key(&self) -> String {
        self.0.clone()
    }

    /// Key of the input log
    pub fn inputs_key(&self) -> String {
        format!("{}:inputs", self.0)
    }

    /// Key of the output log
    pub fn outputs_key(&self) -> String {
        format!("{}:outputs", self.0)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for OperationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An invocable operation whose calls can be counted and recorded.
///
/// Inputs and outputs must be serializable so the recorder can log them in
/// a stable, human-readable form.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Argument type
    type Input: Serialize + Send + 'static;

    /// Result type
    type Output: Serialize + Send + 'static;

    /// Invoke the operation
    async fn call(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Adapts an async closure into an [`Operation`]
pub struct FnOperation<F, I, O> {
    f: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<F, I, O> FnOperation<F, I, O> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, I, O> Operation for FnOperation<F, I, O>
where
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O>> + Send + 'static,
    I: Serialize + Send + 'static,
    O: Serialize + Send + 'static,
{
    type Input = I;
    type Output = O;

    async fn call(&self, input: I) -> Result<O> {
        (self.f)(input).await
    }
}
