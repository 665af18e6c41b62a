//! Middleware specifications - the declarative shapes resolved into steps

use crate::core::chain::Chain;
use crate::core::condition::ConditionalArm;
use crate::core::context::ChainContext;
use crate::core::step::{sync_step, Flow, HandlerError, Step};
use std::fmt;
use std::sync::Arc;

/// A declarative middleware specification
///
/// Configuration surfaces (service, resource, action) describe their
/// middleware in one of these shapes; the spec resolver turns them into
/// concrete chain steps at compile time. The explicit discriminant replaces
/// the shape-sniffing a dynamic runtime would do.
#[derive(Clone)]
pub enum MiddlewareSpec {
    /// A single step; its declared name wins over the resolver's fallback
    Step {
        name: Option<String>,
        step: Arc<dyn Step>,
    },
    /// `"<stack>"` or `"<stack>.<step>"` reference into the stack registry
    Reference(String),
    /// An ordered list of `(when, then)` pairs, compiled as one step
    Conditional(Vec<ConditionalArm>),
    /// A heterogeneous list, resolved element by element
    List(Vec<MiddlewareSpec>),
    /// An inline sub-chain, absorbed wholesale
    SubChain(Chain),
}

impl MiddlewareSpec {
    /// An anonymous step (named by the resolver's fallback)
    pub fn step(step: Arc<dyn Step>) -> Self {
        MiddlewareSpec::Step { name: None, step }
    }

    /// A step with a declared name
    pub fn named(name: impl Into<String>, step: Arc<dyn Step>) -> Self {
        MiddlewareSpec::Step {
            name: Some(name.into()),
            step,
        }
    }

    /// An anonymous synchronous step
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&mut ChainContext) -> Result<Flow, HandlerError> + Send + Sync + 'static,
    {
        Self::step(sync_step(f))
    }

    pub fn reference(spec: impl Into<String>) -> Self {
        MiddlewareSpec::Reference(spec.into())
    }

    pub fn conditional(arms: Vec<ConditionalArm>) -> Self {
        MiddlewareSpec::Conditional(arms)
    }

    pub fn list(specs: Vec<MiddlewareSpec>) -> Self {
        MiddlewareSpec::List(specs)
    }

    pub fn sub_chain(chain: Chain) -> Self {
        MiddlewareSpec::SubChain(chain)
    }
}

impl fmt::Debug for MiddlewareSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareSpec::Step { name, .. } => {
                f.debug_struct("Step").field("name", name).finish()
            }
            MiddlewareSpec::Reference(r) => f.debug_tuple("Reference").field(r).finish(),
            MiddlewareSpec::Conditional(arms) => {
                f.debug_tuple("Conditional").field(&arms.len()).finish()
            }
            MiddlewareSpec::List(items) => f.debug_list().entries(items).finish(),
            MiddlewareSpec::SubChain(chain) => {
                f.debug_tuple("SubChain").field(&chain.name()).finish()
            }
        }
    }
}
