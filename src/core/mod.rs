//! Core domain models for switchboard
//!
//! This module defines the fundamental data structures that represent
//! chains, steps, envelopes, and the configuration surfaces pipelines are
//! compiled from.

pub mod chain;
pub mod condition;
pub mod context;
pub mod envelope;
pub mod resource;
pub mod spec;
pub mod step;
pub mod strategy;

pub use chain::*;
pub use condition::*;
pub use context::*;
pub use envelope::*;
pub use resource::*;
pub use spec::*;
pub use step::*;
pub use strategy::{ErrorFn, ErrorStrategy, ErrorStrategyMap};
