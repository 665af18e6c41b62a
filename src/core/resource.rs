//! Resource and action configuration surfaces

use crate::core::spec::MiddlewareSpec;
use crate::core::strategy::{ErrorStrategy, ErrorStrategyMap};
use std::collections::BTreeMap;

/// The scope a property specifier addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Service,
    Resource,
    Action,
}

impl Scope {
    /// Parse a scope prefix; unrecognized prefixes default to `Service`
    pub fn parse(prefix: &str) -> Self {
        match prefix {
            "resource" => Scope::Resource,
            "action" => Scope::Action,
            _ => Scope::Service,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Service => "service",
            Scope::Resource => "resource",
            Scope::Action => "action",
        }
    }
}

/// Service-level configuration surface
///
/// Every property is optional; an absent property simply contributes no
/// steps to compiled pipelines.
#[derive(Debug, Clone, Default)]
pub struct ServiceSurface {
    pub middleware: Option<MiddlewareSpec>,
    pub transform: Option<MiddlewareSpec>,
    pub errors: ErrorStrategyMap,
}

impl ServiceSurface {
    pub fn with_middleware(mut self, spec: MiddlewareSpec) -> Self {
        self.middleware = Some(spec);
        self
    }

    pub fn with_transform(mut self, spec: MiddlewareSpec) -> Self {
        self.transform = Some(spec);
        self
    }

    pub fn with_error(mut self, kind: impl Into<String>, strategy: ErrorStrategy) -> Self {
        self.errors.insert(kind.into(), strategy);
        self
    }
}

/// A named action: the terminal unit of work plus optional per-action config
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    /// The terminal unit of work; required
    pub handle: MiddlewareSpec,
    pub middleware: Option<MiddlewareSpec>,
    pub transform: Option<MiddlewareSpec>,
    /// Overrides resource- and service-level strategies on key collision
    pub errors: ErrorStrategyMap,
}

impl Action {
    pub fn new(name: impl Into<String>, handle: MiddlewareSpec) -> Self {
        Self {
            name: name.into(),
            handle,
            middleware: None,
            transform: None,
            errors: ErrorStrategyMap::new(),
        }
    }

    pub fn with_middleware(mut self, spec: MiddlewareSpec) -> Self {
        self.middleware = Some(spec);
        self
    }

    pub fn with_transform(mut self, spec: MiddlewareSpec) -> Self {
        self.transform = Some(spec);
        self
    }

    pub fn with_error(mut self, kind: impl Into<String>, strategy: ErrorStrategy) -> Self {
        self.errors.insert(kind.into(), strategy);
        self
    }
}

/// A named group of actions with resource-scoped middleware and strategies
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub middleware: Option<MiddlewareSpec>,
    pub transform: Option<MiddlewareSpec>,
    pub errors: ErrorStrategyMap,
    pub actions: BTreeMap<String, Action>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            middleware: None,
            transform: None,
            errors: ErrorStrategyMap::new(),
            actions: BTreeMap::new(),
        }
    }

    pub fn with_middleware(mut self, spec: MiddlewareSpec) -> Self {
        self.middleware = Some(spec);
        self
    }

    pub fn with_transform(mut self, spec: MiddlewareSpec) -> Self {
        self.transform = Some(spec);
        self
    }

    pub fn with_error(mut self, kind: impl Into<String>, strategy: ErrorStrategy) -> Self {
        self.errors.insert(kind.into(), strategy);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.insert(action.name.clone(), action);
        self
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }
}
