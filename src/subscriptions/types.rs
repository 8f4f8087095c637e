//! Subscription types for live slice updates.

use crate::types::RequestStatus;
use serde::{Deserialize, Serialize};

/// Configuration for a subscription.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionConfig {
    /// Max buffered events before the subscriber is dropped.
    /// `None` uses the store's `subscription_buffer_size`.
    pub buffer_size: Option<usize>,

    /// Send a `Snapshot` of every matching slice right after subscribing.
    pub send_initial: bool,

    /// Filter criteria.
    pub filter: SubscriptionFilter,
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// Only these resources (None = all resources).
    pub resources: Option<Vec<String>>,
}

impl SubscriptionFilter {
    /// Subscribe to every resource.
    pub fn all() -> Self {
        Self::default()
    }

    /// Subscribe to specific resources.
    pub fn resources(names: Vec<String>) -> Self {
        Self {
            resources: Some(names),
        }
    }

    pub fn matches(&self, resource: &str) -> bool {
        match &self.resources {
            Some(names) => names.iter().any(|name| name == resource),
            None => true,
        }
    }
}

/// Events emitted by subscriptions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// Current slice, sent once on subscribe when requested.
    Snapshot {
        resource: String,
        slice: serde_json::Value,
    },

    /// A dispatched event replaced a slice.
    SliceChanged {
        resource: String,
        /// Label of the event that caused the change, e.g. `list_succeeded`.
        event: String,
        list_status: RequestStatus,
        single_status: RequestStatus,
        /// JSON rendering of the new slice.
        slice: serde_json::Value,
    },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<StoreEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<StoreEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<StoreEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<StoreEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
