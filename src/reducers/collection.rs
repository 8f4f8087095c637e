//! Collection ("many") state and its reducer.

use crate::descriptor::{EventRoutes, Operation};
use crate::error::Result;
use crate::events::ResourceEvent;
use crate::types::{Action, ErrorInfo, RequestStatus, Resource};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Keyed records in display order, plus the status of the last list-level
/// request.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionState<R: Resource> {
    items_by_id: HashMap<R::Id, R>,
    /// Display order. Always holds exactly the keys of `items_by_id`.
    ids: Vec<R::Id>,
    status: RequestStatus,
    error: Option<ErrorInfo>,
    /// Server-side total from a paginated list response.
    count: Option<u64>,
}

impl<R: Resource> Default for CollectionState<R> {
    fn default() -> Self {
        Self {
            items_by_id: HashMap::new(),
            ids: Vec::new(),
            status: RequestStatus::Idle,
            error: None,
            count: None,
        }
    }
}

impl<R: Resource> CollectionState<R> {
    pub fn ids(&self) -> &[R::Id] {
        &self.ids
    }

    pub fn items_by_id(&self) -> &HashMap<R::Id, R> {
        &self.items_by_id
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.items_by_id.get(id)
    }

    pub fn contains(&self, id: &R::Id) -> bool {
        self.items_by_id.contains_key(id)
    }

    /// Records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.ids.iter().filter_map(|id| self.items_by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn count(&self) -> Option<u64> {
        self.count
    }

    fn is_pristine(&self) -> bool {
        self.ids.is_empty()
            && self.status == RequestStatus::Idle
            && self.error.is_none()
            && self.count.is_none()
    }

    /// Fresh collection in arrival order. A repeated id keeps its first
    /// position and its last value.
    fn from_records(records: &[R], count: Option<u64>) -> Self {
        let mut state = Self {
            status: RequestStatus::Succeeded,
            count,
            ..Self::default()
        };
        for record in records {
            state.upsert(record.clone());
        }
        state
    }

    fn upsert(&mut self, record: R) {
        let id = record.id();
        if self.items_by_id.insert(id.clone(), record).is_none() {
            self.ids.push(id);
        }
    }

    fn with_status(&self, status: RequestStatus, error: Option<ErrorInfo>) -> Self {
        Self {
            status,
            error,
            ..self.clone()
        }
    }
}

impl<R: Resource> Serialize for CollectionState<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let items: Vec<&R> = self.iter().collect();
        let mut s = serializer.serialize_struct("CollectionState", 5)?;
        s.serialize_field("ids", &self.ids)?;
        s.serialize_field("items", &items)?;
        s.serialize_field("status", &self.status)?;
        s.serialize_field("error", &self.error)?;
        s.serialize_field("count", &self.count)?;
        s.end()
    }
}

/// Reducer for list-level operations: list, create, delete, plus mirroring
/// successful updates into the collection.
pub struct CollectionReducer<R> {
    routes: Arc<EventRoutes>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for CollectionReducer<R> {
    fn clone(&self) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
            _record: PhantomData,
        }
    }
}

impl<R: Resource> CollectionReducer<R> {
    pub(crate) fn new(routes: Arc<EventRoutes>) -> Self {
        Self {
            routes,
            _record: PhantomData,
        }
    }

    pub fn routes(&self) -> &EventRoutes {
        &self.routes
    }

    /// Apply a typed event. Returns `state` itself when nothing changes.
    pub fn reduce(
        &self,
        state: &Arc<CollectionState<R>>,
        event: &ResourceEvent<R>,
    ) -> Arc<CollectionState<R>> {
        match transition(state, event) {
            Some(next) => Arc::new(next),
            None => Arc::clone(state),
        }
    }

    /// Apply a wire action. Actions this resource does not know leave the
    /// state untouched.
    pub fn reduce_action(
        &self,
        state: &Arc<CollectionState<R>>,
        action: &Action,
    ) -> Result<Arc<CollectionState<R>>> {
        match self.routes.resolve(&action.event_type) {
            Some(kind) => Ok(self.reduce(state, &ResourceEvent::decode(kind, action)?)),
            None => Ok(Arc::clone(state)),
        }
    }
}

fn transition<R: Resource>(
    state: &CollectionState<R>,
    event: &ResourceEvent<R>,
) -> Option<CollectionState<R>> {
    use Operation::{Create, Delete, List};

    match event {
        // Items stay visible while the request is in flight.
        ResourceEvent::Requested(List | Create | Delete) => {
            Some(state.with_status(RequestStatus::Pending, None))
        }
        ResourceEvent::Failed(List | Create | Delete, error) => {
            Some(state.with_status(RequestStatus::Failed, Some(error.clone())))
        }
        ResourceEvent::ListSucceeded { records, count } => {
            Some(CollectionState::from_records(records, *count))
        }
        ResourceEvent::CreateSucceeded(record) => {
            let mut next = state.with_status(RequestStatus::Succeeded, None);
            next.upsert(record.clone());
            Some(next)
        }
        ResourceEvent::DeleteSucceeded(id) => {
            if !state.contains(id) {
                return None;
            }
            let mut next = state.with_status(RequestStatus::Succeeded, None);
            next.items_by_id.remove(id);
            next.ids.retain(|existing| existing != id);
            Some(next)
        }
        ResourceEvent::UpdateSucceeded(record) => {
            let id = record.id();
            if !state.contains(&id) {
                return None;
            }
            let mut next = state.clone();
            next.items_by_id.insert(id, record.clone());
            Some(next)
        }
        ResourceEvent::Reset if !state.is_pristine() => Some(CollectionState::default()),
        _ => None,
    }
}
