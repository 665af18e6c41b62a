//! Pipeline compilation: layout, spec resolution, and the compiled registry

pub mod compiler;
pub mod layout;
pub mod resolver;

pub use compiler::{compile_all, CompiledPipeline, PipelineRegistry};
pub use layout::{LayoutError, PipelineLayout, PropertySpec};
pub use resolver::{resolve_spec, CompileError, StackRegistry};
