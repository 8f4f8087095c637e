//! Store instances that own resource slices and route actions to them.

use crate::descriptor::{EventRoutes, ResourceDescriptor};
use crate::error::{Result, StoreError};
use crate::events::ResourceEvent;
use crate::factory::StoreFactory;
use crate::reducers::{CollectionState, ResourceReducer, ResourceSlice, SingleState};
use crate::subscriptions::{
    StoreEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::types::{Action, Resource};
use parking_lot::{RwLock, RwLockReadGuard};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Fail `dispatch` for actions no registered resource handles, instead
    /// of ignoring them.
    pub reject_unrouted: bool,

    /// Buffered events per subscriber before it is dropped.
    pub subscription_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reject_unrouted: false,
            subscription_buffer_size: crate::subscriptions::DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Result of dispatching one action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No registered resource handles the action type.
    Ignored,
    /// The named resource handled the action but its slice did not change.
    Unchanged(String),
    /// The named resource's slice was replaced.
    Changed(String),
}

impl DispatchOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, DispatchOutcome::Changed(_))
    }

    pub fn resource(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Ignored => None,
            DispatchOutcome::Unchanged(name) | DispatchOutcome::Changed(name) => Some(name),
        }
    }
}

/// State for one resource type: a [`ResourceSlice`] plus the reducer that
/// replaces it.
///
/// Writes are serialized, so events apply in the order they are
/// dispatched. Readers get `Arc` snapshots that never change under them.
pub struct ResourceStore<R: Resource> {
    name: String,
    reducer: ResourceReducer<R>,
    state: RwLock<Arc<ResourceSlice<R>>>,
    subscriptions: Arc<SubscriptionManager>,
}

impl<R: Resource> ResourceStore<R> {
    /// A standalone resource store with its own subscriptions.
    pub fn new(descriptor: &ResourceDescriptor) -> Result<Self> {
        Self::with_subscriptions(descriptor, Arc::new(SubscriptionManager::new()))
    }

    pub(crate) fn with_subscriptions(
        descriptor: &ResourceDescriptor,
        subscriptions: Arc<SubscriptionManager>,
    ) -> Result<Self> {
        let reducer = StoreFactory::build_combined(descriptor)?;
        Ok(Self {
            name: descriptor.resource().to_string(),
            reducer,
            state: RwLock::new(Arc::default()),
            subscriptions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routes(&self) -> &EventRoutes {
        self.reducer.routes()
    }

    /// Current slice.
    pub fn state(&self) -> Arc<ResourceSlice<R>> {
        Arc::clone(&*self.state.read())
    }

    pub fn list(&self) -> Arc<CollectionState<R>> {
        Arc::clone(&self.state.read().list)
    }

    pub fn single(&self) -> Arc<SingleState<R>> {
        Arc::clone(&self.state.read().single)
    }

    /// Derive a value from the current slice.
    pub fn select<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&ResourceSlice<R>) -> T,
    {
        let state = self.state();
        f(&state)
    }

    /// Apply a typed event. Returns whether the slice changed.
    pub fn apply(&self, event: &ResourceEvent<R>) -> bool {
        let mut state = self.state.write();
        let next = self.reducer.reduce(&*state, event);
        if Arc::ptr_eq(&next, &*state) {
            trace!(resource = %self.name, event = %event.kind(), "slice unchanged");
            return false;
        }
        *state = Arc::clone(&next);

        // Still under the write lock so subscribers see changes in order.
        self.notify(&event.kind().to_string(), &next);
        true
    }

    /// Decode and apply a wire action. Returns whether the slice changed;
    /// actions for other resources return `Ok(false)`.
    pub fn dispatch(&self, action: &Action) -> Result<bool> {
        match self.reducer.decode(action) {
            Ok(Some(event)) => Ok(self.apply(&event)),
            Ok(None) => Ok(false),
            Err(e) => {
                warn!(
                    resource = %self.name,
                    event = %action.event_type,
                    error = %e,
                    "rejected action"
                );
                Err(e)
            }
        }
    }

    /// JSON rendering of the current slice.
    pub fn snapshot_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&*self.state())?)
    }

    /// Subscribe to changes of this resource.
    ///
    /// The initial snapshot, if requested, is taken under the read lock
    /// before the subscription is registered, so it always arrives ahead
    /// of the first `SliceChanged`.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        if !(config.send_initial && config.filter.matches(&self.name)) {
            return self.subscriptions.subscribe(config);
        }

        let state = self.state.read();
        let handle = self.subscriptions.subscribe(config);
        send_snapshot(&self.subscriptions, handle.id, &self.name, state.snapshot_json());
        handle
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    fn notify(&self, event: &str, slice: &ResourceSlice<R>) {
        if !self.subscriptions.wants(&self.name) {
            return;
        }
        match serde_json::to_value(slice) {
            Ok(value) => self.subscriptions.broadcast_change(
                &self.name,
                event,
                slice.list.status(),
                slice.single.status(),
                value,
            ),
            Err(e) => warn!(resource = %self.name, error = %e, "failed to serialize slice"),
        }
    }
}

fn send_snapshot(
    subscriptions: &SubscriptionManager,
    id: SubscriptionId,
    resource: &str,
    slice: Result<serde_json::Value>,
) {
    match slice {
        Ok(slice) => {
            let event = StoreEvent::Snapshot {
                resource: resource.to_string(),
                slice,
            };
            if !subscriptions.send_to(id, event) {
                warn!(resource, subscription = id.0, "initial snapshot not delivered");
            }
        }
        Err(e) => warn!(resource, error = %e, "failed to serialize slice"),
    }
}

/// A slice held under its read lock.
trait LockedSlice {
    fn snapshot_json(&self) -> Result<serde_json::Value>;
}

impl<R: Resource> LockedSlice for RwLockReadGuard<'_, Arc<ResourceSlice<R>>> {
    fn snapshot_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&***self)?)
    }
}

/// Type-erased view of a [`ResourceStore`] held by [`Store`].
trait SliceHandle: Send + Sync {
    fn dispatch(&self, action: &Action) -> Result<bool>;

    fn snapshot_json(&self) -> Result<serde_json::Value>;

    /// Hold the slice's read lock; no change can be applied until the
    /// returned guard is dropped.
    fn read_locked(&self) -> Box<dyn LockedSlice + '_>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<R> SliceHandle for ResourceStore<R>
where
    R: Resource + Send + Sync + 'static,
    R::Id: Send + Sync,
{
    fn dispatch(&self, action: &Action) -> Result<bool> {
        ResourceStore::dispatch(self, action)
    }

    fn snapshot_json(&self) -> Result<serde_json::Value> {
        ResourceStore::snapshot_json(self)
    }

    fn read_locked(&self) -> Box<dyn LockedSlice + '_> {
        Box::new(self.state.read())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// The application store: one slice per registered resource type.
///
/// Explicitly constructed and passed by reference; nothing is global.
pub struct Store {
    config: StoreConfig,

    /// Resource stores by resource name.
    resources: RwLock<HashMap<String, Arc<dyn SliceHandle>>>,

    /// Event name -> resource name.
    routes: RwLock<HashMap<String, String>>,

    subscriptions: Arc<SubscriptionManager>,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        let subscriptions = Arc::new(SubscriptionManager::with_buffer_size(
            config.subscription_buffer_size,
        ));
        Self {
            config,
            resources: RwLock::new(HashMap::new()),
            routes: RwLock::new(HashMap::new()),
            subscriptions,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- Registration ---

    /// Register a resource type and materialize its empty slice.
    pub fn register<R>(&self, descriptor: &ResourceDescriptor) -> Result<Arc<ResourceStore<R>>>
    where
        R: Resource + Send + Sync + 'static,
        R::Id: Send + Sync,
    {
        let store = Arc::new(ResourceStore::<R>::with_subscriptions(
            descriptor,
            Arc::clone(&self.subscriptions),
        )?);
        let name = store.name().to_string();

        let mut resources = self.resources.write();
        let mut routes = self.routes.write();

        if resources.contains_key(&name) {
            return Err(StoreError::ResourceExists(name));
        }
        for event in store.routes().names() {
            if let Some(owner) = routes.get(event) {
                return Err(StoreError::EventNameConflict {
                    event: event.to_string(),
                    resource: owner.clone(),
                });
            }
        }

        let mut bound = 0;
        for event in store.routes().names() {
            routes.insert(event.to_string(), name.clone());
            bound += 1;
        }
        resources.insert(name.clone(), Arc::clone(&store) as Arc<dyn SliceHandle>);

        info!(resource = %name, events = bound, "registered resource");
        Ok(store)
    }

    /// Look up a registered resource by name.
    pub fn resource<R>(&self, name: &str) -> Result<Arc<ResourceStore<R>>>
    where
        R: Resource + Send + Sync + 'static,
        R::Id: Send + Sync,
    {
        let handle = self.handle(name)?;
        handle
            .into_any()
            .downcast::<ResourceStore<R>>()
            .map_err(|_| StoreError::ResourceTypeMismatch(name.to_string()))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.resources.read().contains_key(name)
    }

    /// Registered resource names, sorted.
    pub fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resources.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn handle(&self, name: &str) -> Result<Arc<dyn SliceHandle>> {
        self.resources
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ResourceNotRegistered(name.to_string()))
    }

    // --- Dispatch ---

    /// Route an action to the resource whose descriptor binds its type.
    pub fn dispatch(&self, action: &Action) -> Result<DispatchOutcome> {
        let name = self.routes.read().get(&action.event_type).cloned();
        let name = match name {
            Some(name) => name,
            None if self.config.reject_unrouted => {
                return Err(StoreError::UnroutedEvent(action.event_type.clone()));
            }
            None => {
                trace!(event = %action.event_type, "no resource handles action");
                return Ok(DispatchOutcome::Ignored);
            }
        };

        let changed = self.handle(&name)?.dispatch(action)?;
        debug!(event = %action.event_type, resource = %name, changed, "dispatched action");

        Ok(if changed {
            DispatchOutcome::Changed(name)
        } else {
            DispatchOutcome::Unchanged(name)
        })
    }

    /// JSON rendering of one resource's slice.
    pub fn snapshot_json(&self, name: &str) -> Result<serde_json::Value> {
        self.handle(name)?.snapshot_json()
    }

    // --- Subscriptions ---

    /// Subscribe to slice changes across resources.
    ///
    /// With `send_initial`, every matching slice is read-locked (in name
    /// order) while the subscription is registered and its snapshots are
    /// sent. Each `Snapshot` therefore precedes that resource's first
    /// `SliceChanged`, and no change falls between the two.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        if !config.send_initial {
            return self.subscriptions.subscribe(config);
        }

        let matching: Vec<(String, Arc<dyn SliceHandle>)> = {
            let resources = self.resources.read();
            let mut matching: Vec<_> = resources
                .iter()
                .filter(|(name, _)| config.filter.matches(name))
                .map(|(name, handle)| (name.clone(), Arc::clone(handle)))
                .collect();
            matching.sort_by(|a, b| a.0.cmp(&b.0));
            matching
        };

        let locked: Vec<_> = matching
            .iter()
            .map(|(name, handle)| (name.as_str(), handle.read_locked()))
            .collect();
        let handle = self.subscriptions.subscribe(config);
        for (name, slice) in &locked {
            send_snapshot(&self.subscriptions, handle.id, name, slice.snapshot_json());
        }
        handle
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
