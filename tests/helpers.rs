//! Test utility functions for switchboard

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use switchboard::dispatch::instrument::{Instrument, WorkFuture, WorkMetadata};
use switchboard::{
    Action, CompiledService, ConditionalArm, ConditionalStep, ErrorStrategy, Flow, HandlerError,
    MiddlewareSpec, Predicate, Resource, Service,
};

/// Initialize test logging; `RUST_LOG` selects what surfaces.
/// Safe to call from every test, only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Instrumentation that records the metadata of every wrapped dispatch
#[derive(Default)]
pub struct RecordingInstrument {
    calls: Mutex<Vec<WorkMetadata>>,
}

impl RecordingInstrument {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn recorded(&self) -> Vec<WorkMetadata> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Instrument for RecordingInstrument {
    async fn instrument(&self, meta: WorkMetadata, call: WorkFuture<'_>) -> Value {
        self.calls.lock().unwrap().push(meta);
        call.await
    }
}

/// Middleware that marks the caller authorized when credentials are present
pub fn auth_middleware() -> MiddlewareSpec {
    MiddlewareSpec::named(
        "auth",
        switchboard::sync_step(|ctx| {
            let authorized = ctx.contains("credentials");
            ctx.set("user", json!({ "authorized": authorized }));
            Ok(Flow::Continue)
        }),
    )
}

/// Conditional that short-circuits unauthorized requests out of the handler
pub fn unauthorized_guard() -> MiddlewareSpec {
    MiddlewareSpec::conditional(vec![ConditionalArm::new(
        Predicate::matching(json!({"user": {"authorized": false}})),
        switchboard::sync_step(|_| Ok(Flow::Done(json!({"unauthorized": true})))),
    )])
}

/// Transform that turns the unauthorized marker into a 401 reply
pub fn unauthorized_transform() -> MiddlewareSpec {
    MiddlewareSpec::conditional(vec![ConditionalArm::new(
        Predicate::matching(json!({"unauthorized": true})),
        switchboard::sync_step(|_| {
            Ok(Flow::Done(json!({"status": 401, "data": "Go Away"})))
        }),
    )])
}

/// The canonical test resource: guarded get/set plus a failing action with
/// layered error strategies
pub fn guarded_resource() -> Resource {
    Resource::new("r1")
        .with_middleware(MiddlewareSpec::list(vec![
            auth_middleware(),
            unauthorized_guard(),
        ]))
        .with_transform(unauthorized_transform())
        .with_error(
            "CustomError",
            ErrorStrategy::template(json!({
                "status": 501,
                "data": "This is a resource level error strategy"
            })),
        )
        .with_action(Action::new(
            "get",
            MiddlewareSpec::sync(|_| Ok(Flow::Done(json!({"status": 200, "data": "OK"})))),
        ))
        .with_action(Action::new(
            "set",
            MiddlewareSpec::sync(|_| Ok(Flow::Done(json!({"status": 201, "data": "OK"})))),
        ))
        .with_action(
            Action::new(
                "customActionError",
                MiddlewareSpec::sync(|_| Err(HandlerError::new("CustomError", "Custom error"))),
            )
            .with_error(
                "CustomError",
                ErrorStrategy::func(|_, _| {
                    json!({
                        "status": 502,
                        "data": "This is an action level error strategy"
                    })
                }),
            ),
        )
        .with_action(Action::new(
            "actionError",
            MiddlewareSpec::sync(|_| Err(HandlerError::new("ActionError", "Action error"))),
        ))
}

/// Compile a service around the canonical resource
pub fn guarded_service() -> CompiledService {
    init_tracing();
    let mut service = Service::default();
    service.register_resource(guarded_resource());
    service.compile().expect("compilation should succeed")
}

/// A conditional step usable directly in chains (not as a spec)
pub fn always(step_result: Value) -> ConditionalStep {
    ConditionalStep::new(vec![ConditionalArm::new(
        Predicate::Always,
        switchboard::sync_step(move |_| Ok(Flow::Done(step_result.clone()))),
    )])
}
