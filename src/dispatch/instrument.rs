//! Instrumentation boundary - observes dispatched work without altering it

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// The unit of work a dispatch hands the instrumentation boundary
pub type WorkFuture<'a> = Pin<Box<dyn Future<Output = Value> + Send + 'a>>;

/// Caller metadata identifying a unit of dispatched work
#[derive(Debug, Clone)]
pub struct WorkMetadata {
    /// `[resource, action, service-name]`
    pub key: Vec<String>,
    pub user: String,
    pub transport: Option<String>,
    pub envelope_id: Uuid,
}

/// Wraps the execution of one dispatched request.
///
/// Implementations must run the call and return its settled outcome
/// unchanged; they observe, they never alter results. Timing, metrics, and
/// timeout policy all live behind this boundary, not in the dispatch core.
#[async_trait]
pub trait Instrument: Send + Sync {
    async fn instrument(&self, meta: WorkMetadata, call: WorkFuture<'_>) -> Value;
}

/// Pass-through instrumentation
#[derive(Debug, Default)]
pub struct NoopInstrument;

#[async_trait]
impl Instrument for NoopInstrument {
    async fn instrument(&self, _meta: WorkMetadata, call: WorkFuture<'_>) -> Value {
        call.await
    }
}

/// Instrumentation that logs each dispatch with its duration
#[derive(Debug, Default)]
pub struct TraceInstrument;

#[async_trait]
impl Instrument for TraceInstrument {
    async fn instrument(&self, meta: WorkMetadata, call: WorkFuture<'_>) -> Value {
        let started = Instant::now();
        let result = call.await;
        debug!(
            key = %meta.key.join("."),
            user = %meta.user,
            transport = meta.transport.as_deref().unwrap_or("none"),
            envelope = %meta.envelope_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dispatch settled"
        );
        result
    }
}
