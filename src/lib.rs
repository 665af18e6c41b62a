//! switchboard - compiles declarative resource/action configuration into
//! asynchronous dispatch pipelines
//!
//! Resources declare middleware, transforms, and error strategies at the
//! service, resource, and action level; the compiler resolves them into
//! ordered step chains keyed by `resource!action`, and the dispatcher routes
//! inbound envelopes through them, normalizing every failure into a
//! structured, transport-agnostic result.

pub mod compile;
pub mod core;
pub mod dispatch;
pub mod service;

// Re-export commonly used types
pub use compile::{compile_all, CompileError, LayoutError, PipelineLayout, PipelineRegistry, StackRegistry};
pub use core::{
    sync_step, unit_step, Action, Chain, ChainContext, ConditionalArm, ConditionalStep, Envelope,
    ErrorStrategy, ErrorStrategyMap, Flow, HandlerError, MiddlewareSpec, NamedStep, Predicate,
    Resource, ServiceSurface, Step, User,
};
pub use dispatch::{Dispatcher, Instrument, NoopInstrument, TraceInstrument};
pub use service::{CompiledService, Service, ServiceConfig};
