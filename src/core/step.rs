//! Step domain model - the unit of chain work

use crate::core::context::ChainContext;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Outcome of a single step invocation
///
/// A step either lets the chain advance (having possibly mutated the shared
/// context) or terminates the chain with a value. This is the control-flow
/// primitive every pipeline is built on: the first step that returns
/// [`Flow::Done`] settles the whole chain, and the remaining steps never run.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Proceed to the next step
    Continue,
    /// Terminate the chain immediately with this value
    Done(Value),
}

/// Domain error raised from within a handler or transform chain
///
/// `kind` is the error-kind name used to select an error strategy at
/// dispatch time (the role the constructor name plays in dynamic runtimes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{kind}: {message}")]
pub struct HandlerError {
    pub kind: String,
    pub message: String,
}

impl HandlerError {
    /// Create an error with an explicit kind
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an error of the generic `Error` kind
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }
}

/// A single unit of chain work
///
/// Implementations receive the shared chain context and decide whether the
/// chain continues or completes. Async work happens inside `call`; the chain
/// awaits it before advancing.
#[async_trait]
pub trait Step: Send + Sync {
    async fn call(&self, ctx: &mut ChainContext) -> Result<Flow, HandlerError>;
}

/// A step paired with the name it was registered under
///
/// Steps are shared by `Arc` so a single step can live in several chains
/// (absorbing a stack clones handles, not work).
#[derive(Clone)]
pub struct NamedStep {
    pub name: String,
    pub step: Arc<dyn Step>,
}

impl NamedStep {
    pub fn new(name: impl Into<String>, step: Arc<dyn Step>) -> Self {
        Self {
            name: name.into(),
            step,
        }
    }
}

impl fmt::Debug for NamedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedStep").field("name", &self.name).finish()
    }
}

struct SyncStep<F> {
    f: F,
}

#[async_trait]
impl<F> Step for SyncStep<F>
where
    F: Fn(&mut ChainContext) -> Result<Flow, HandlerError> + Send + Sync,
{
    async fn call(&self, ctx: &mut ChainContext) -> Result<Flow, HandlerError> {
        (self.f)(ctx)
    }
}

/// Wrap a synchronous closure as a step
///
/// Most middleware is synchronous logic over the context; steps that need
/// genuinely asynchronous work implement [`Step`] directly.
pub fn sync_step<F>(f: F) -> Arc<dyn Step>
where
    F: Fn(&mut ChainContext) -> Result<Flow, HandlerError> + Send + Sync + 'static,
{
    Arc::new(SyncStep { f })
}

/// A step that terminates the chain with the current context value
///
/// Appended as the terminal step of every transform chain so executing a
/// transform against any reply always settles.
pub fn unit_step() -> Arc<dyn Step> {
    sync_step(|ctx| Ok(Flow::Done(ctx.value().clone())))
}
