//! Request dispatch over compiled pipelines

pub mod dispatcher;
pub mod instrument;

pub use dispatcher::Dispatcher;
pub use instrument::{Instrument, NoopInstrument, TraceInstrument, WorkFuture, WorkMetadata};
