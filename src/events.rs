//! Typed resource events and their decoding from wire actions.

use crate::descriptor::{EventKind, Operation, Phase};
use crate::error::{Result, StoreError};
use crate::types::{Action, ErrorInfo, Resource};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// An event the reducers understand, with its payload already decoded.
#[derive(Clone, Debug, PartialEq)]
pub enum ResourceEvent<R: Resource> {
    /// A request for `Operation` was issued.
    Requested(Operation),
    /// A request for `Operation` failed.
    Failed(Operation, ErrorInfo),
    /// The list request returned. `count` is the server-side total when the
    /// response was paginated.
    ListSucceeded { records: Vec<R>, count: Option<u64> },
    CreateSucceeded(R),
    UpdateSucceeded(R),
    FetchOneSucceeded(R),
    DeleteSucceeded(R::Id),
    /// Local edit of the focused record; no request involved.
    Set(R),
    Reset,
}

impl<R: Resource> ResourceEvent<R> {
    /// Unpaginated list result.
    pub fn list_succeeded(records: Vec<R>) -> Self {
        ResourceEvent::ListSucceeded {
            records,
            count: None,
        }
    }

    pub fn failed(operation: Operation, error: impl Into<ErrorInfo>) -> Self {
        ResourceEvent::Failed(operation, error.into())
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ResourceEvent::Requested(op) => EventKind::Lifecycle(*op, Phase::Requested),
            ResourceEvent::Failed(op, _) => EventKind::Lifecycle(*op, Phase::Failed),
            ResourceEvent::ListSucceeded { .. } => {
                EventKind::Lifecycle(Operation::List, Phase::Succeeded)
            }
            ResourceEvent::CreateSucceeded(_) => {
                EventKind::Lifecycle(Operation::Create, Phase::Succeeded)
            }
            ResourceEvent::UpdateSucceeded(_) => {
                EventKind::Lifecycle(Operation::Update, Phase::Succeeded)
            }
            ResourceEvent::FetchOneSucceeded(_) => {
                EventKind::Lifecycle(Operation::FetchOne, Phase::Succeeded)
            }
            ResourceEvent::DeleteSucceeded(_) => {
                EventKind::Lifecycle(Operation::Delete, Phase::Succeeded)
            }
            ResourceEvent::Set(_) => EventKind::Set,
            ResourceEvent::Reset => EventKind::Reset,
        }
    }

    /// Decode the payload of `action`, already resolved to `kind`.
    pub fn decode(kind: EventKind, action: &Action) -> Result<Self> {
        let event = match kind {
            EventKind::Lifecycle(op, Phase::Requested) => ResourceEvent::Requested(op),
            EventKind::Lifecycle(op, Phase::Failed) => {
                let error = action.payload.clone().unwrap_or(Value::Null);
                ResourceEvent::Failed(op, ErrorInfo(error))
            }
            EventKind::Lifecycle(Operation::List, Phase::Succeeded) => {
                decode_list(action, require_payload(action)?)?
            }
            EventKind::Lifecycle(Operation::Create, Phase::Succeeded) => {
                ResourceEvent::CreateSucceeded(decode_value(action, require_payload(action)?)?)
            }
            EventKind::Lifecycle(Operation::Update, Phase::Succeeded) => {
                ResourceEvent::UpdateSucceeded(decode_value(action, require_payload(action)?)?)
            }
            EventKind::Lifecycle(Operation::FetchOne, Phase::Succeeded) => {
                ResourceEvent::FetchOneSucceeded(decode_value(action, require_payload(action)?)?)
            }
            EventKind::Lifecycle(Operation::Delete, Phase::Succeeded) => {
                ResourceEvent::DeleteSucceeded(decode_id::<R>(action, require_payload(action)?)?)
            }
            EventKind::Set => ResourceEvent::Set(decode_value(action, require_payload(action)?)?),
            EventKind::Reset => ResourceEvent::Reset,
        };
        Ok(event)
    }
}

fn invalid(action: &Action, reason: impl Into<String>) -> StoreError {
    StoreError::InvalidPayload {
        event: action.event_type.clone(),
        reason: reason.into(),
    }
}

fn require_payload(action: &Action) -> Result<&Value> {
    action
        .payload
        .as_ref()
        .ok_or_else(|| invalid(action, "missing payload"))
}

fn decode_value<T: DeserializeOwned>(action: &Action, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| invalid(action, e.to_string()))
}

/// Accepts a bare array or a paginated body `{"count": n, "results": [...]}`.
fn decode_list<R: Resource>(action: &Action, value: &Value) -> Result<ResourceEvent<R>> {
    match value {
        Value::Array(_) => Ok(ResourceEvent::ListSucceeded {
            records: decode_value(action, value)?,
            count: None,
        }),
        Value::Object(obj) => {
            let results = obj
                .get("results")
                .ok_or_else(|| invalid(action, "paginated body has no results"))?;
            Ok(ResourceEvent::ListSucceeded {
                records: decode_value(action, results)?,
                count: obj.get("count").and_then(Value::as_u64),
            })
        }
        _ => Err(invalid(action, "expected an array or a paginated object")),
    }
}

/// Accepts a bare id or an object carrying an `id` field.
fn decode_id<R: Resource>(action: &Action, value: &Value) -> Result<R::Id> {
    match R::Id::deserialize(value) {
        Ok(id) => Ok(id),
        Err(e) => match value.get("id") {
            Some(id) => decode_value(action, id),
            None => Err(invalid(action, e.to_string())),
        },
    }
}
