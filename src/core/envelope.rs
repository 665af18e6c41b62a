//! Dispatch envelope - the request-shaped payload a transport hands the core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Caller identity attached to an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// The identity dispatch assumes when a transport supplies none
    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }
}

/// Inbound request envelope
///
/// Transports are free to attach arbitrary extra fields (credentials, body,
/// headers); they flow into `fields` and are visible to middleware through
/// the chain context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Correlation id for logs and instrumentation
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub resource: String,

    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Name of the transport that produced the envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,

    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,

    /// Transport-supplied extras
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Envelope {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            resource: resource.into(),
            action: action.into(),
            user: None,
            transport: None,
            received_at: Utc::now(),
            fields: Map::new(),
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = Some(transport.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// The pipeline-registry key for this envelope
    pub fn key(&self) -> String {
        format!("{}!{}", self.resource, self.action)
    }

    /// The user on the envelope, or the anonymous default
    pub fn user_or_anonymous(&self) -> User {
        self.user.clone().unwrap_or_else(User::anonymous)
    }

    /// The envelope as a JSON value (the handler chain's initial context)
    pub fn as_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
