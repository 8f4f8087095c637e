//! Core types for the resource store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// A record type fetched from a remote API.
///
/// Identity is the only thing the store looks at; the rest of the payload
/// is opaque and owned by the caller.
pub trait Resource: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Stable identifier used to key the collection.
    type Id: Clone + Eq + Hash + fmt::Debug + Serialize + DeserializeOwned;

    fn id(&self) -> Self::Id;
}

/// Lifecycle of the most recent request applied to a slice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl RequestStatus {
    pub fn is_pending(self) -> bool {
        self == RequestStatus::Pending
    }

    pub fn is_failed(self) -> bool {
        self == RequestStatus::Failed
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Pending => "pending",
            RequestStatus::Succeeded => "succeeded",
            RequestStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Error payload of a failed request, forwarded verbatim from the event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorInfo(pub serde_json::Value);

impl ErrorInfo {
    /// Build an error payload of the form `{"message": ...}`.
    pub fn message_only(message: impl Into<String>) -> Self {
        ErrorInfo(serde_json::json!({ "message": message.into() }))
    }

    /// Human-readable message, if the payload carries one.
    ///
    /// Looks at `message` first, then `detail` (the key REST framework
    /// error bodies use), then a bare JSON string.
    pub fn message(&self) -> Option<&str> {
        match &self.0 {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Object(obj) => obj
                .get("message")
                .or_else(|| obj.get("detail"))
                .and_then(|v| v.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ErrorInfo {
    fn from(value: serde_json::Value) -> Self {
        ErrorInfo(value)
    }
}

/// An action as dispatched by the transport layer.
///
/// Serializes as `{"type": "...", "payload": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Action {
    /// An action without payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: None,
        }
    }

    /// An action carrying a JSON payload.
    pub fn with_payload(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload: Some(payload),
        }
    }

    /// An action whose payload is serialized from `payload`.
    pub fn json(
        event_type: impl Into<String>,
        payload: &impl Serialize,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_type: event_type.into(),
            payload: Some(serde_json::to_value(payload)?),
        })
    }
}
