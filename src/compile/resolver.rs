//! Spec resolver - turns middleware specifications into chain steps

use crate::core::chain::Chain;
use crate::core::condition::ConditionalStep;
use crate::core::spec::MiddlewareSpec;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Errors raised while resolving specifications or compiling pipelines
///
/// These are startup-time failures: they abort the compilation pass that
/// triggered them and never occur at request time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("A stack named '{0}' was specified but not found")]
    StackNotFound(String),

    #[error("A step named '{step}' for stack '{stack}' was specified but not found")]
    StepNotFound { stack: String, step: String },
}

/// Named middleware stacks available for string references
///
/// Populated during setup; string specs like `"auth"` or `"auth.bearer"`
/// resolve against it at compile time.
#[derive(Debug, Default)]
pub struct StackRegistry {
    stacks: BTreeMap<String, Chain>,
}

impl StackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stack under its own name
    pub fn register(&mut self, stack: Chain) {
        self.stacks.insert(stack.name().to_string(), stack);
    }

    pub fn get(&self, name: &str) -> Option<&Chain> {
        self.stacks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stacks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stacks.keys().map(String::as_str)
    }
}

/// Resolve a middleware specification into steps appended to `chain`.
///
/// Resolution is deterministic and never mutates the spec; identical specs
/// always produce identical step ordering and naming. `fallback` names
/// steps that carry no name of their own, and nested lists derive
/// `"<fallback>-<index>"` names so siblings never collide.
pub fn resolve_spec(
    stacks: &StackRegistry,
    chain: &mut Chain,
    spec: &MiddlewareSpec,
    fallback: &str,
) -> Result<(), CompileError> {
    match spec {
        MiddlewareSpec::Step { name, step } => {
            let name = name.as_deref().unwrap_or(fallback);
            trace!(chain = %chain.name(), step = %name, "appending step");
            chain.append(step.clone(), name);
        }
        MiddlewareSpec::Reference(reference) => {
            resolve_reference(stacks, chain, reference)?;
        }
        MiddlewareSpec::Conditional(arms) => {
            chain.append(Arc::new(ConditionalStep::new(arms.clone())), fallback);
        }
        MiddlewareSpec::List(items) => {
            for (index, item) in items.iter().enumerate() {
                resolve_spec(stacks, chain, item, &format!("{fallback}-{index}"))?;
            }
        }
        MiddlewareSpec::SubChain(sub) => {
            trace!(chain = %chain.name(), from = %sub.name(), "absorbing sub-chain");
            chain.absorb(sub);
        }
    }
    Ok(())
}

// a reference is either a whole stack or one of its named steps
fn resolve_reference(
    stacks: &StackRegistry,
    chain: &mut Chain,
    reference: &str,
) -> Result<(), CompileError> {
    let (stack_name, step_name) = match reference.split_once('.') {
        Some((stack, step)) => (stack, Some(step)),
        None => (reference, None),
    };

    let stack = stacks
        .get(stack_name)
        .ok_or_else(|| CompileError::StackNotFound(stack_name.to_string()))?;

    match step_name {
        Some(step_name) => {
            let named = stack
                .step_named(step_name)
                .ok_or_else(|| CompileError::StepNotFound {
                    stack: stack_name.to_string(),
                    step: step_name.to_string(),
                })?;
            // namespaced so the extracted step cannot collide with a
            // previous or future step of the same name
            chain.append(named.step.clone(), format!("{stack_name}:{step_name}"));
        }
        None => chain.absorb(stack),
    }
    Ok(())
}
