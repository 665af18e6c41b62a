//! Dispatch core - routes envelopes through compiled pipelines

use crate::compile::compiler::{CompiledPipeline, PipelineRegistry};
use crate::core::context::ChainContext;
use crate::core::envelope::Envelope;
use crate::core::strategy;
use crate::dispatch::instrument::{Instrument, NoopInstrument, WorkMetadata};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Request dispatcher over a compiled pipeline registry
///
/// Per request: resolve the pipeline by `resource!action` key, execute the
/// handler chain, pipe success through the transform chain, and funnel any
/// failure through the merged error strategies. Every dispatch settles with
/// exactly one structured result; failures never escape as errors.
pub struct Dispatcher {
    registry: Arc<PipelineRegistry>,
    instrument: Arc<dyn Instrument>,
    service_name: String,
}

impl Dispatcher {
    pub fn new(registry: Arc<PipelineRegistry>, service_name: impl Into<String>) -> Self {
        Self {
            registry,
            instrument: Arc::new(NoopInstrument),
            service_name: service_name.into(),
        }
    }

    pub fn with_instrument(mut self, instrument: Arc<dyn Instrument>) -> Self {
        self.instrument = instrument;
        self
    }

    /// Dispatch an envelope, always settling with a structured result
    pub async fn dispatch(&self, envelope: Envelope) -> Value {
        let key = envelope.key();
        let Some(pipeline) = self.registry.get(&key) else {
            // chances are, if you hit this, you have a transport behaving
            // _very_ badly
            warn!(
                resource = %envelope.resource,
                action = %envelope.action,
                "no handler registered for envelope"
            );
            return json!({
                "status": 404,
                "data": format!(
                    "No handler found for {} - {}",
                    envelope.resource, envelope.action
                ),
            });
        };

        let user = envelope.user_or_anonymous();
        let meta = WorkMetadata {
            key: vec![
                envelope.resource.clone(),
                envelope.action.clone(),
                self.service_name.clone(),
            ],
            user: user.id,
            transport: envelope.transport.clone(),
            envelope_id: envelope.id,
        };

        self.instrument
            .instrument(meta, Box::pin(run_pipeline(pipeline, &envelope)))
            .await
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("service", &self.service_name)
            .field("pipelines", &self.registry.len())
            .finish()
    }
}

async fn run_pipeline(pipeline: &CompiledPipeline, envelope: &Envelope) -> Value {
    let key = envelope.key();
    debug!(%key, "executing handler chain");

    let mut ctx = ChainContext::from_value(envelope.as_value());
    let reply = match pipeline.handler.execute(&mut ctx).await {
        Ok(reply) => reply,
        Err(error) => {
            debug!(%key, kind = %error.kind, "handler chain failed; resolving strategy");
            return strategy::resolve(&pipeline.errors, envelope, &error);
        }
    };

    // stamp the reply with a back-reference to the originating envelope
    // before transforming (only objects can carry the stamp)
    let mut transform_ctx = ChainContext::from_value(reply);
    transform_ctx.set("_request", envelope.as_value());

    match pipeline.transform.execute(&mut transform_ctx).await {
        Ok(result) => result,
        Err(error) => {
            // transform failures reuse the handler's strategies
            debug!(%key, kind = %error.kind, "transform chain failed; resolving strategy");
            strategy::resolve(&pipeline.errors, envelope, &error)
        }
    }
}
