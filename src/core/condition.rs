//! Conditional steps - when/then branching inside a chain

use crate::core::context::ChainContext;
use crate::core::step::{Flow, HandlerError, Step};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate evaluated against the chain context
#[derive(Clone)]
pub enum Predicate {
    /// Matches any context
    Always,
    /// Arbitrary function of the context
    Func(Arc<dyn Fn(&ChainContext) -> bool + Send + Sync>),
    /// Deep-subset template match against the context value
    Match(Value),
}

impl Predicate {
    /// Deep-subset template predicate
    pub fn matching(template: Value) -> Self {
        Predicate::Match(template)
    }

    /// Function predicate
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&ChainContext) -> bool + Send + Sync + 'static,
    {
        Predicate::Func(Arc::new(f))
    }

    /// Evaluate the predicate against a context
    pub fn matches(&self, ctx: &ChainContext) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Func(f) => f(ctx),
            Predicate::Match(template) => deep_subset(template, ctx.value()),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => write!(f, "Always"),
            Predicate::Func(_) => write!(f, "Func"),
            Predicate::Match(template) => write!(f, "Match({template})"),
        }
    }
}

/// One `(when, then)` pair of a conditional step
#[derive(Clone)]
pub struct ConditionalArm {
    pub when: Predicate,
    pub then: Arc<dyn Step>,
}

impl ConditionalArm {
    pub fn new(when: Predicate, then: Arc<dyn Step>) -> Self {
        Self { when, then }
    }
}

impl fmt::Debug for ConditionalArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalArm")
            .field("when", &self.when)
            .finish()
    }
}

/// A step built from an ordered list of `(when, then)` pairs
///
/// Predicates are evaluated synchronously in declared order; the first match
/// selects the handler that runs as the step body. When nothing matches the
/// step is a no-op and the chain advances - a conditional never stalls or
/// fails a chain on its own.
#[derive(Clone, Debug)]
pub struct ConditionalStep {
    arms: Vec<ConditionalArm>,
}

impl ConditionalStep {
    pub fn new(arms: Vec<ConditionalArm>) -> Self {
        Self { arms }
    }
}

#[async_trait]
impl Step for ConditionalStep {
    async fn call(&self, ctx: &mut ChainContext) -> Result<Flow, HandlerError> {
        for arm in &self.arms {
            if arm.when.matches(ctx) {
                return arm.then.call(ctx).await;
            }
        }
        Ok(Flow::Continue)
    }
}

/// Whether every leaf of `template` is present and equal in `value`
///
/// Objects are compared key-by-key recursively; any other value (including
/// arrays) must be exactly equal. Extra fields in `value` are ignored.
pub fn deep_subset(template: &Value, value: &Value) -> bool {
    match (template, value) {
        (Value::Object(tmpl), Value::Object(actual)) => tmpl
            .iter()
            .all(|(key, t)| actual.get(key).is_some_and(|v| deep_subset(t, v))),
        _ => template == value,
    }
}
