//! Service facade - setup, compilation, and the read-only compiled service

use crate::compile::compiler::{compile_all, PipelineRegistry};
use crate::compile::layout::PipelineLayout;
use crate::compile::resolver::{CompileError, StackRegistry};
use crate::core::chain::Chain;
use crate::core::envelope::Envelope;
use crate::core::resource::{Action, Resource, ServiceSurface};
use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::instrument::Instrument;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Service-wide configuration supplied at setup time
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Service name, used in instrumentation keys
    pub name: String,
    /// Service-scope configuration surface
    pub service: ServiceSurface,
    pub handler_layout: PipelineLayout,
    pub transform_layout: PipelineLayout,
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service: ServiceSurface::default(),
            handler_layout: PipelineLayout::default_handler(),
            transform_layout: PipelineLayout::default_transform(),
        }
    }

    pub fn with_surface(mut self, surface: ServiceSurface) -> Self {
        self.service = surface;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new("switchboard")
    }
}

/// A service during its single-threaded setup window
///
/// Resources, middleware stacks, and layout edits are all collected here;
/// [`Service::compile`] consumes the service, so nothing can be mutated once
/// pipelines exist.
pub struct Service {
    config: ServiceConfig,
    stacks: StackRegistry,
    resources: BTreeMap<String, Resource>,
}

impl Service {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            stacks: StackRegistry::new(),
            resources: BTreeMap::new(),
        }
    }

    /// Register a resource; a later registration under the same name wins
    pub fn register_resource(&mut self, resource: Resource) {
        self.resources.insert(resource.name.clone(), resource);
    }

    /// Register a named middleware stack for string references
    pub fn register_stack(&mut self, stack: Chain) {
        self.stacks.register(stack);
    }

    /// Edit the handler layout (pre-compilation only)
    pub fn handler_layout_mut(&mut self) -> &mut PipelineLayout {
        &mut self.config.handler_layout
    }

    /// Edit the transform layout (pre-compilation only)
    pub fn transform_layout_mut(&mut self) -> &mut PipelineLayout {
        &mut self.config.transform_layout
    }

    /// Compile every resource/action pair and freeze the service
    pub fn compile(self) -> Result<CompiledService, CompileError> {
        info!(
            service = %self.config.name,
            resources = self.resources.len(),
            "compiling service pipelines"
        );
        let registry = compile_all(
            &self.config.service,
            &self.resources,
            &self.stacks,
            &self.config.handler_layout,
            &self.config.transform_layout,
        )?;
        let registry = Arc::new(registry);
        let dispatcher = Dispatcher::new(registry.clone(), self.config.name.clone());
        Ok(CompiledService {
            name: self.config.name,
            resources: self.resources,
            registry,
            dispatcher,
        })
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

/// A compiled, read-only service ready for request traffic
///
/// Safe to share across concurrently dispatched requests; each request only
/// mutates its own envelope-derived context.
pub struct CompiledService {
    name: String,
    resources: BTreeMap<String, Resource>,
    registry: Arc<PipelineRegistry>,
    dispatcher: Dispatcher,
}

impl fmt::Debug for CompiledService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledService")
            .field("name", &self.name)
            .field("resources", &self.resources.len())
            .field("pipelines", &self.registry.len())
            .finish()
    }
}

impl CompiledService {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Swap the instrumentation boundary
    pub fn with_instrument(mut self, instrument: Arc<dyn Instrument>) -> Self {
        self.dispatcher =
            Dispatcher::new(self.registry.clone(), self.name.clone()).with_instrument(instrument);
        self
    }

    /// Dispatch an envelope through its compiled pipeline
    pub async fn dispatch(&self, envelope: Envelope) -> Value {
        self.dispatcher.dispatch(envelope).await
    }

    /// Compiled `resource!action` keys, in sorted order
    pub fn pipeline_keys(&self) -> impl Iterator<Item = &str> {
        self.registry.keys()
    }

    /// Registered resources, in sorted order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Every (resource, action) pair, in sorted order
    pub fn actions(&self) -> impl Iterator<Item = (&Resource, &Action)> {
        self.resources
            .values()
            .flat_map(|r| r.actions.values().map(move |a| (r, a)))
    }
}
