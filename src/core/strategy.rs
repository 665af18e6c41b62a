//! Error strategies - configured rules for turning failures into results

use crate::core::envelope::Envelope;
use crate::core::step::HandlerError;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Strategy function signature: `(envelope, error) -> result`
pub type ErrorFn = Arc<dyn Fn(&Envelope, &HandlerError) -> Value + Send + Sync>;

/// A configured rule producing a structured result for one error kind
#[derive(Clone)]
pub enum ErrorStrategy {
    /// Compute the result from the envelope and error
    Func(ErrorFn),
    /// A static result template, returned as-is
    Template(Value),
    /// A template whose fields are overridden by `handle`'s output
    TemplateWithHandle { template: Value, handle: ErrorFn },
}

impl ErrorStrategy {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Envelope, &HandlerError) -> Value + Send + Sync + 'static,
    {
        ErrorStrategy::Func(Arc::new(f))
    }

    pub fn template(template: Value) -> Self {
        ErrorStrategy::Template(template)
    }

    pub fn template_with_handle<F>(template: Value, handle: F) -> Self
    where
        F: Fn(&Envelope, &HandlerError) -> Value + Send + Sync + 'static,
    {
        ErrorStrategy::TemplateWithHandle {
            template,
            handle: Arc::new(handle),
        }
    }
}

impl fmt::Debug for ErrorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStrategy::Func(_) => write!(f, "Func"),
            ErrorStrategy::Template(t) => f.debug_tuple("Template").field(t).finish(),
            ErrorStrategy::TemplateWithHandle { template, .. } => {
                f.debug_tuple("TemplateWithHandle").field(template).finish()
            }
        }
    }
}

/// Error strategies keyed by error-kind name
pub type ErrorStrategyMap = BTreeMap<String, ErrorStrategy>;

/// Resolve an error into a structured result; never fails.
///
/// Lookup order, first hit wins: the exact kind, the kind with its trailing
/// `Error` suffix stripped, the generic `Error` key, then the built-in
/// default.
pub fn resolve(strategies: &ErrorStrategyMap, envelope: &Envelope, error: &HandlerError) -> Value {
    let strategy = strategies
        .get(&error.kind)
        .or_else(|| {
            error
                .kind
                .strip_suffix("Error")
                .and_then(|stripped| strategies.get(stripped))
        })
        .or_else(|| strategies.get("Error"));

    match strategy {
        Some(ErrorStrategy::Func(f)) => f(envelope, error),
        Some(ErrorStrategy::Template(template)) => template.clone(),
        Some(ErrorStrategy::TemplateWithHandle { template, handle }) => {
            merge_over(template.clone(), handle(envelope, error))
        }
        None => default_strategy(envelope, error),
    }
}

fn default_strategy(envelope: &Envelope, error: &HandlerError) -> Value {
    json!({
        "status": 500,
        "error": error,
        "data": format!(
            "An unhandled error of '{}' occurred at {} - {}",
            error.kind, envelope.resource, envelope.action
        ),
    })
}

/// Shallow merge: `patch` keys win; non-object patches replace the base
fn merge_over(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base), Value::Object(patch)) => {
            for (key, value) in patch {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_error() -> HandlerError {
        HandlerError::new("CustomError", "Custom error")
    }

    fn envelope() -> Envelope {
        Envelope::new("r1", "get")
    }

    #[test]
    fn test_exact_kind_template() {
        let mut strategies = ErrorStrategyMap::new();
        strategies.insert(
            "CustomError".to_string(),
            ErrorStrategy::template(json!({"status": 501, "data": "X"})),
        );

        let result = resolve(&strategies, &envelope(), &custom_error());
        assert_eq!(result, json!({"status": 501, "data": "X"}));
    }

    #[test]
    fn test_stripped_suffix_lookup() {
        let mut strategies = ErrorStrategyMap::new();
        strategies.insert(
            "Custom".to_string(),
            ErrorStrategy::template(json!({"status": 400})),
        );

        let result = resolve(&strategies, &envelope(), &custom_error());
        assert_eq!(result, json!({"status": 400}));
    }

    #[test]
    fn test_generic_error_fallback() {
        let mut strategies = ErrorStrategyMap::new();
        strategies.insert(
            "Error".to_string(),
            ErrorStrategy::func(|_, err| json!({"status": 503, "data": err.message})),
        );

        let result = resolve(&strategies, &envelope(), &custom_error());
        assert_eq!(result, json!({"status": 503, "data": "Custom error"}));
    }

    #[test]
    fn test_builtin_default() {
        let result = resolve(&ErrorStrategyMap::new(), &envelope(), &custom_error());

        assert_eq!(result["status"], json!(500));
        assert_eq!(
            result["data"],
            json!("An unhandled error of 'CustomError' occurred at r1 - get")
        );
        assert_eq!(result["error"]["kind"], json!("CustomError"));
    }

    #[test]
    fn test_template_with_handle_merge() {
        let mut strategies = ErrorStrategyMap::new();
        strategies.insert(
            "CustomError".to_string(),
            ErrorStrategy::template_with_handle(
                json!({"status": 501, "data": "template", "keep": true}),
                |_, err| json!({"data": err.message}),
            ),
        );

        let result = resolve(&strategies, &envelope(), &custom_error());
        assert_eq!(
            result,
            json!({"status": 501, "data": "Custom error", "keep": true})
        );
    }

    #[test]
    fn test_function_strategy_receives_envelope() {
        let mut strategies = ErrorStrategyMap::new();
        strategies.insert(
            "CustomError".to_string(),
            ErrorStrategy::func(|env, _| json!({"at": env.resource})),
        );

        let result = resolve(&strategies, &envelope(), &custom_error());
        assert_eq!(result, json!({"at": "r1"}));
    }
}
