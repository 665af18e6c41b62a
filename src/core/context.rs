//! Chain context - the shared environment a chain executes against

use serde_json::Value;

/// Mutable environment threaded through every step of a chain.
///
/// Handler chains run against the inbound envelope; transform chains run
/// against the reply produced by the handler chain. Either way the context
/// is a JSON value that steps may read, mutate, or match predicates on.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainContext {
    value: Value,
}

impl ChainContext {
    /// Create an empty (object) context
    pub fn new() -> Self {
        Self {
            value: Value::Object(serde_json::Map::new()),
        }
    }

    /// Create a context from an arbitrary value
    ///
    /// Handler replies are not required to be objects, so the context keeps
    /// whatever shape it is given; field accessors simply return `None` on
    /// non-object values.
    pub fn from_value(value: Value) -> Self {
        Self { value }
    }

    /// The full context value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the context, yielding its value
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Get a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.as_object().and_then(|map| map.get(key))
    }

    /// Set a top-level field
    ///
    /// A null context is promoted to an object so early steps can seed
    /// fields; setting a field on any other non-object value is a no-op.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        if self.value.is_null() {
            self.value = Value::Object(serde_json::Map::new());
        }
        if let Some(map) = self.value.as_object_mut() {
            map.insert(key.into(), value);
        }
    }

    /// Remove a top-level field, returning it if present
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.value.as_object_mut().and_then(|map| map.remove(key))
    }

    /// Whether a top-level field is present
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl Default for ChainContext {
    fn default() -> Self {
        Self::new()
    }
}
