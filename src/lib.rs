//! # Resource Store
//!
//! Client-side state for remote resources, kept in step with request
//! lifecycles (requested, succeeded, failed).
//!
//! ## Core Concepts
//!
//! - **Descriptors**: per resource type, which event names mean what
//! - **Reducers**: pure functions from (state, event) to state, one for the
//!   collection and one for the focused record
//! - **Slices**: `{list, single}` state per resource, replaced wholesale on
//!   change and shared as `Arc` snapshots
//! - **Store**: an explicit instance routing actions to slices and
//!   notifying subscribers
//!
//! ## Example
//!
//! ```ignore
//! use resource_store::{Action, ResourceDescriptor, Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::default());
//! let issues = store.register::<Issue>(&ResourceDescriptor::conventional("issues"))?;
//!
//! store.dispatch(&Action::new("ISSUES_LIST_REQUESTED"))?;
//! store.dispatch(&Action::with_payload(
//!     "ISSUES_LIST_SUCCEEDED",
//!     json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]),
//! ))?;
//!
//! assert_eq!(issues.list().ids(), &[1, 2]);
//! ```

pub mod descriptor;
pub mod error;
pub mod events;
pub mod factory;
pub mod reducers;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use descriptor::{EventKind, EventRoutes, Operation, Phase, ResourceDescriptor};
pub use error::{Result, StoreError};
pub use events::ResourceEvent;
pub use factory::StoreFactory;
pub use reducers::{
    combine, CollectionReducer, CollectionState, ResourceReducer, ResourceSlice, SingleReducer,
    SingleState,
};
pub use store::{DispatchOutcome, ResourceStore, Store, StoreConfig};
pub use subscriptions::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, SubscriptionManager,
};
pub use types::*;
