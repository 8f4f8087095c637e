//! Error types for the resource store.

use crate::descriptor::{Operation, Phase};
use thiserror::Error;

/// Main error type for store operations.
///
/// Failed requests are not errors at this layer: they are recorded in the
/// slice as [`RequestStatus::Failed`](crate::RequestStatus::Failed).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Descriptor has an empty resource name")]
    EmptyResourceName,

    #[error("Descriptor for {resource} has no event name for {operation} {phase}")]
    MissingEventName {
        resource: String,
        operation: Operation,
        phase: Phase,
    },

    #[error("Event name {name} is bound more than once in descriptor for {resource}")]
    DuplicateEventName { resource: String, name: String },

    #[error("Resource not registered: {0}")]
    ResourceNotRegistered(String),

    #[error("Resource already registered: {0}")]
    ResourceExists(String),

    #[error("Resource {0} was registered with a different record type")]
    ResourceTypeMismatch(String),

    #[error("Event {event} is already handled by resource {resource}")]
    EventNameConflict { event: String, resource: String },

    #[error("No resource handles event: {0}")]
    UnroutedEvent(String),

    #[error("Invalid payload for {event}: {reason}")]
    InvalidPayload { event: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
