//! Subscription system for live slice updates.
//!
//! Subscribers receive a [`StoreEvent::SliceChanged`] every time a
//! dispatched event replaces a resource slice. Subscriptions support:
//! - Filtering by resource name
//! - An initial snapshot of each matching slice
//! - Bounded buffers with slow-subscriber dropping
//!
//! # Example
//!
//! ```ignore
//! let handle = store.subscribe(SubscriptionConfig {
//!     filter: SubscriptionFilter::resources(vec!["issues".to_string()]),
//!     send_initial: true,
//!     ..Default::default()
//! });
//!
//! loop {
//!     match handle.recv() {
//!         Ok(StoreEvent::SliceChanged { resource, slice, .. }) => render(&resource, &slice),
//!         Ok(StoreEvent::Snapshot { resource, slice }) => render(&resource, &slice),
//!         Ok(StoreEvent::Dropped { .. }) | Err(_) => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::{SubscriptionManager, DEFAULT_BUFFER_SIZE};
pub use types::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId,
};
