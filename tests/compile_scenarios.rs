//! Scenario tests: layout editing, stack references, and compile failures

mod helpers;

use serde_json::{json, Value};
use switchboard::{
    sync_step, Action, Chain, CompileError, Envelope, Flow, LayoutError, MiddlewareSpec, Resource,
    Service,
};

fn totals_stack() -> Chain {
    let mut stack = Chain::new("totals");
    stack.append(
        sync_step(|ctx| {
            let total = ctx.get("total").and_then(Value::as_i64).unwrap_or(0);
            ctx.set("total", json!(total + 1));
            Ok(Flow::Continue)
        }),
        "increment",
    );
    stack.append(
        sync_step(|ctx| {
            let total = ctx.get("total").and_then(Value::as_i64).unwrap_or(0);
            Ok(Flow::Done(json!({"status": 200, "data": total})))
        }),
        "report",
    );
    stack
}

/// A bare stack name pulls the whole stack into the handler chain
#[tokio::test]
async fn test_whole_stack_reference() {
    helpers::init_tracing();
    let mut service = Service::default();
    service.register_stack(totals_stack());
    service.register_resource(Resource::new("r1").with_action(Action::new(
        "count",
        MiddlewareSpec::reference("totals"),
    )));
    let compiled = service.compile().unwrap();

    let envelope = Envelope::new("r1", "count").with_field("total", json!(4));
    let result = compiled.dispatch(envelope).await;

    assert_eq!(result["status"], json!(200));
    assert_eq!(result["data"], json!(5));
}

/// A dotted reference extracts one step under its namespaced name
#[tokio::test]
async fn test_single_step_reference() {
    let mut service = Service::default();
    service.register_stack(totals_stack());
    service.register_resource(Resource::new("r1").with_action(Action::new(
        "count",
        MiddlewareSpec::reference("totals.report"),
    )));
    let compiled = service.compile().unwrap();

    // only the report step ran; no increment happened
    let envelope = Envelope::new("r1", "count").with_field("total", json!(4));
    let result = compiled.dispatch(envelope).await;

    assert_eq!(result["data"], json!(4));
}

/// Referencing an unregistered stack aborts compilation with the original
/// condition; no partial registry is observable
#[test]
fn test_missing_stack_aborts_compilation() {
    let mut service = Service::default();
    service.register_resource(
        Resource::new("r1")
            .with_action(Action::new(
                "good",
                MiddlewareSpec::sync(|_| Ok(Flow::Done(json!({"status": 200})))),
            ))
            .with_action(Action::new("bad", MiddlewareSpec::reference("ghost"))),
    );

    let err = service.compile().unwrap_err();
    assert_eq!(err, CompileError::StackNotFound("ghost".to_string()));
    assert_eq!(
        err.to_string(),
        "A stack named 'ghost' was specified but not found"
    );
}

#[test]
fn test_missing_step_aborts_compilation() {
    let mut service = Service::default();
    service.register_stack(totals_stack());
    service.register_resource(Resource::new("r1").with_action(Action::new(
        "bad",
        MiddlewareSpec::reference("totals.missing"),
    )));

    let err = service.compile().unwrap_err();
    assert_eq!(
        err.to_string(),
        "A step named 'missing' for stack 'totals' was specified but not found"
    );
}

/// Layout edits before compilation change what the compiled chains contain
#[tokio::test]
async fn test_layout_edit_feeds_extra_surface_into_handler() {
    let mut service = Service::default();
    // pull the resource transform spec into the handler chain as well
    service
        .handler_layout_mut()
        .insert_before("action.handle", "resource.transform")
        .unwrap();
    service.register_resource(
        Resource::new("r1")
            .with_transform(MiddlewareSpec::named(
                "tag",
                sync_step(|ctx| {
                    ctx.set("tagged", json!(true));
                    Ok(Flow::Continue)
                }),
            ))
            .with_action(Action::new(
                "get",
                MiddlewareSpec::sync(|ctx| {
                    Ok(Flow::Done(json!({"status": 200, "tagged": ctx.get("tagged")})))
                }),
            )),
    );
    let compiled = service.compile().unwrap();

    let result = compiled.dispatch(Envelope::new("r1", "get")).await;
    assert_eq!(result["tagged"], json!(true));
}

#[test]
fn test_layout_edit_against_missing_anchor_fails() {
    let mut service = Service::default();
    let err = service
        .handler_layout_mut()
        .insert_after("action.nonsense", "action.audit")
        .unwrap_err();

    assert_eq!(
        err,
        LayoutError::MissingAnchorAfter {
            step: "action.audit".to_string(),
            anchor: "action.nonsense".to_string(),
        }
    );
}

/// Compiling the same configuration twice yields the same registry shape
#[test]
fn test_compilation_is_deterministic() {
    let build = || {
        let mut service = Service::default();
        service.register_stack(totals_stack());
        service.register_resource(helpers::guarded_resource());
        service.compile().unwrap()
    };

    let first: Vec<String> = build().pipeline_keys().map(String::from).collect();
    let second: Vec<String> = build().pipeline_keys().map(String::from).collect();
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec!["r1!actionError", "r1!customActionError", "r1!get", "r1!set"]
    );
}
