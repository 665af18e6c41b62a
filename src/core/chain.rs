//! Chain - an ordered, named sequence of steps with short-circuit execution

use crate::core::context::ChainContext;
use crate::core::step::{Flow, HandlerError, NamedStep, Step};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Named, ordered collection of steps
///
/// Execution is strictly sequential: each step runs against the shared
/// context, and the first step that returns [`Flow::Done`] settles the chain
/// with its value. A chain whose every step continues settles with
/// `Value::Null`; compiled transform chains always end in a terminal unit
/// step, so they settle with the transformed reply instead.
#[derive(Clone)]
pub struct Chain {
    name: String,
    steps: Vec<NamedStep>,
}

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a step under the given name
    pub fn append(&mut self, step: Arc<dyn Step>, name: impl Into<String>) {
        self.steps.push(NamedStep::new(name, step));
    }

    /// Absorb another chain's steps wholesale, preserving order and names
    pub fn absorb(&mut self, other: &Chain) {
        self.steps.extend(other.steps.iter().cloned());
    }

    /// Look up a step by the name it was registered under
    ///
    /// On duplicate names the first registration wins, matching ordered
    /// execution.
    pub fn step_named(&self, name: &str) -> Option<&NamedStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Names of the steps in execution order
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }

    /// Execute the chain against a context
    pub async fn execute(&self, ctx: &mut ChainContext) -> Result<Value, HandlerError> {
        for named in &self.steps {
            match named.step.call(ctx).await? {
                Flow::Continue => {}
                Flow::Done(value) => {
                    debug!(chain = %self.name, step = %named.name, "chain short-circuited");
                    return Ok(value);
                }
            }
        }
        Ok(Value::Null)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("steps", &self.step_names().collect::<Vec<_>>())
            .finish()
    }
}
