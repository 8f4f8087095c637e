//! Subscription manager for broadcasting slice changes.

use crate::types::RequestStatus;
use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

use super::types::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};

/// Default number of buffered events per subscriber.
pub const DEFAULT_BUFFER_SIZE: usize = 1000;

/// Internal subscription state.
struct Subscription {
    config: SubscriptionConfig,
    sender: Sender<StoreEvent>,
}

impl Subscription {
    /// Try to send an event. Returns false if buffer is full (subscriber will be dropped).
    fn try_send(&self, event: StoreEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }

    fn matches(&self, resource: &str) -> bool {
        self.config.filter.matches(resource)
    }
}

/// Manages subscriptions and broadcasts events.
pub struct SubscriptionManager {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
    /// Buffer size for subscriptions that don't set their own.
    default_buffer_size: usize,
}

impl SubscriptionManager {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Create a new subscription manager with a custom default buffer size.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            default_buffer_size: buffer_size,
        }
    }

    /// Create a new subscription.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let buffer_size = config.buffer_size.unwrap_or(self.default_buffer_size);
        let (sender, receiver) = bounded(buffer_size);

        self.subscriptions
            .write()
            .insert(id, Subscription { config, sender });

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        if let Some(sub) = subs.remove(&id) {
            // Best effort
            let _ = sub.sender.try_send(StoreEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Whether any subscription listens to `resource`. Lets callers skip
    /// serializing a slice nobody will read.
    pub fn wants(&self, resource: &str) -> bool {
        self.subscriptions
            .read()
            .values()
            .any(|sub| sub.matches(resource))
    }

    /// Broadcast a slice change to matching subscriptions.
    pub fn broadcast_change(
        &self,
        resource: &str,
        event: &str,
        list_status: RequestStatus,
        single_status: RequestStatus,
        slice: serde_json::Value,
    ) {
        let event = StoreEvent::SliceChanged {
            resource: resource.to_string(),
            event: event.to_string(),
            list_status,
            single_status,
            slice,
        };

        self.broadcast(|sub| sub.matches(resource), event);
    }

    /// Internal broadcast helper. Drops subscribers that fail to receive.
    fn broadcast<F>(&self, filter: F, event: StoreEvent)
    where
        F: Fn(&Subscription) -> bool,
    {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if filter(sub) && !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    warn!(subscription = id.0, "dropping slow subscriber");
                    // Might fail too, the buffer is full
                    let _ = sub.sender.try_send(StoreEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }

    /// Send an event directly to one subscription (initial snapshots).
    /// Returns false if the subscription is gone or its buffer is full.
    pub fn send_to(&self, id: SubscriptionId, event: StoreEvent) -> bool {
        let subs = self.subscriptions.read();
        match subs.get(&id) {
            Some(sub) => sub.try_send(event),
            None => false,
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}
