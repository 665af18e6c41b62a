//! Pipeline compiler - builds the chain/transform/strategy triple per action

use crate::compile::layout::{PipelineLayout, PropertySpec};
use crate::compile::resolver::{resolve_spec, CompileError, StackRegistry};
use crate::core::chain::Chain;
use crate::core::resource::{Action, Resource, Scope, ServiceSurface};
use crate::core::spec::MiddlewareSpec;
use crate::core::step::unit_step;
use crate::core::strategy::ErrorStrategyMap;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Everything dispatch needs for one `resource!action` key
#[derive(Debug, Clone)]
pub struct CompiledPipeline {
    pub handler: Chain,
    pub transform: Chain,
    /// Merged strategies: action over resource over service
    pub errors: ErrorStrategyMap,
}

/// Read-only mapping from `resource!action` key to compiled pipeline
///
/// Built once before request traffic begins and shared immutably across
/// concurrent dispatches; no request ever mutates it.
#[derive(Debug, Default)]
pub struct PipelineRegistry {
    pipelines: BTreeMap<String, CompiledPipeline>,
}

impl PipelineRegistry {
    pub fn get(&self, key: &str) -> Option<&CompiledPipeline> {
        self.pipelines.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pipelines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

/// Compile every resource/action pair into the registry.
///
/// A failure on any pair aborts the whole pass; callers never observe a
/// partially-built registry. Given identical inputs the result is identical
/// (resources and actions iterate in sorted order).
pub fn compile_all(
    service: &ServiceSurface,
    resources: &BTreeMap<String, Resource>,
    stacks: &StackRegistry,
    handler_layout: &PipelineLayout,
    transform_layout: &PipelineLayout,
) -> Result<PipelineRegistry, CompileError> {
    let mut pipelines = BTreeMap::new();

    for resource in resources.values() {
        for action in resource.actions.values() {
            let key = format!("{}!{}", resource.name, action.name);

            let handler = build_chain(&key, service, resource, action, stacks, handler_layout)?;

            let mut transform =
                build_chain(&key, service, resource, action, stacks, transform_layout)?;
            // a transform chain is never empty: executing it against any
            // reply must settle with a value
            transform.append(unit_step(), "unit");

            let mut errors = service.errors.clone();
            errors.extend(resource.errors.clone());
            errors.extend(action.errors.clone());

            debug!(
                %key,
                handler_steps = handler.len(),
                transform_steps = transform.len(),
                "compiled pipeline"
            );
            pipelines.insert(
                key,
                CompiledPipeline {
                    handler,
                    transform,
                    errors,
                },
            );
        }
    }

    info!(pipelines = pipelines.len(), "pipeline compilation complete");
    Ok(PipelineRegistry { pipelines })
}

fn build_chain(
    key: &str,
    service: &ServiceSurface,
    resource: &Resource,
    action: &Action,
    stacks: &StackRegistry,
    layout: &PipelineLayout,
) -> Result<Chain, CompileError> {
    let mut chain = Chain::new(key);
    for entry in layout.iter() {
        if let Some(spec) = property_value(service, resource, action, entry) {
            resolve_spec(stacks, &mut chain, spec, &entry.property)?;
        }
    }
    Ok(chain)
}

// find the property value for a "scope.property" specifier; absent targets
// and unknown properties yield None, never an error
fn property_value<'a>(
    service: &'a ServiceSurface,
    resource: &'a Resource,
    action: &'a Action,
    entry: &PropertySpec,
) -> Option<&'a MiddlewareSpec> {
    match entry.scope {
        Scope::Service => match entry.property.as_str() {
            "middleware" => service.middleware.as_ref(),
            "transform" => service.transform.as_ref(),
            _ => None,
        },
        Scope::Resource => match entry.property.as_str() {
            "middleware" => resource.middleware.as_ref(),
            "transform" => resource.transform.as_ref(),
            _ => None,
        },
        Scope::Action => match entry.property.as_str() {
            "middleware" => action.middleware.as_ref(),
            "transform" => action.transform.as_ref(),
            "handle" => Some(&action.handle),
            _ => None,
        },
    }
}
