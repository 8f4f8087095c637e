//! Composition of the collection and single reducers into one slice.

use super::collection::{CollectionReducer, CollectionState};
use super::single::{SingleReducer, SingleState};
use crate::descriptor::EventRoutes;
use crate::error::Result;
use crate::events::ResourceEvent;
use crate::types::{Action, Resource};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// All state for one resource type.
#[derive(Debug)]
pub struct ResourceSlice<R: Resource> {
    pub list: Arc<CollectionState<R>>,
    pub single: Arc<SingleState<R>>,
}

impl<R: Resource> Default for ResourceSlice<R> {
    fn default() -> Self {
        Self {
            list: Arc::default(),
            single: Arc::default(),
        }
    }
}

impl<R: Resource> Clone for ResourceSlice<R> {
    fn clone(&self) -> Self {
        Self {
            list: Arc::clone(&self.list),
            single: Arc::clone(&self.single),
        }
    }
}

impl<R: Resource> Serialize for ResourceSlice<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ResourceSlice", 2)?;
        s.serialize_field("list", &*self.list)?;
        s.serialize_field("single", &*self.single)?;
        s.end()
    }
}

/// Reducer over a [`ResourceSlice`]. Each half sees every event and neither
/// can touch the other's state.
pub struct ResourceReducer<R> {
    list: CollectionReducer<R>,
    single: SingleReducer<R>,
}

impl<R> Clone for ResourceReducer<R> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            single: self.single.clone(),
        }
    }
}

/// Namespace a collection reducer and a single reducer under one slice.
pub fn combine<R: Resource>(
    list: CollectionReducer<R>,
    single: SingleReducer<R>,
) -> ResourceReducer<R> {
    ResourceReducer { list, single }
}

impl<R: Resource> ResourceReducer<R> {
    pub fn list(&self) -> &CollectionReducer<R> {
        &self.list
    }

    pub fn single(&self) -> &SingleReducer<R> {
        &self.single
    }

    /// Event routes used to decode wire actions.
    pub fn routes(&self) -> &EventRoutes {
        self.list.routes()
    }

    /// Decode a wire action into a typed event, or `None` if no route
    /// matches.
    pub fn decode(&self, action: &Action) -> Result<Option<ResourceEvent<R>>> {
        match self.routes().resolve(&action.event_type) {
            Some(kind) => Ok(Some(ResourceEvent::decode(kind, action)?)),
            None => Ok(None),
        }
    }

    /// Apply a typed event. Unchanged halves keep their `Arc`, and if both
    /// are unchanged the slice itself is returned.
    pub fn reduce(
        &self,
        state: &Arc<ResourceSlice<R>>,
        event: &ResourceEvent<R>,
    ) -> Arc<ResourceSlice<R>> {
        let list = self.list.reduce(&state.list, event);
        let single = self.single.reduce(&state.single, event);

        if Arc::ptr_eq(&list, &state.list) && Arc::ptr_eq(&single, &state.single) {
            Arc::clone(state)
        } else {
            Arc::new(ResourceSlice { list, single })
        }
    }

    /// Decode and apply a wire action. On a decoding error the state is not
    /// touched.
    pub fn reduce_action(
        &self,
        state: &Arc<ResourceSlice<R>>,
        action: &Action,
    ) -> Result<Arc<ResourceSlice<R>>> {
        match self.decode(action)? {
            Some(event) => Ok(self.reduce(state, &event)),
            None => Ok(Arc::clone(state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Operation;
    use crate::factory::StoreFactory;
    use crate::reducers::test_support::{descriptor, issue, Issue};
    use crate::types::RequestStatus;
    use serde_json::json;

    fn reducer() -> ResourceReducer<Issue> {
        StoreFactory::build_combined(&descriptor()).unwrap()
    }

    #[test]
    fn test_list_event_leaves_single_untouched() {
        let reducer = reducer();
        let state: Arc<ResourceSlice<Issue>> = Arc::default();

        let next = reducer.reduce(&state, &ResourceEvent::Requested(Operation::List));
        assert!(!Arc::ptr_eq(&state, &next));
        assert!(Arc::ptr_eq(&state.single, &next.single));
        assert_eq!(next.list.status(), RequestStatus::Pending);
    }

    #[test]
    fn test_single_edit_leaves_list_untouched() {
        let reducer = reducer();
        let state = reducer.reduce(
            &Arc::default(),
            &ResourceEvent::list_succeeded(vec![issue(1, "a"), issue(2, "b")]),
        );

        let next = reducer.reduce(&state, &ResourceEvent::Set(issue(2, "draft")));
        assert!(Arc::ptr_eq(&state.list, &next.list));
        assert_eq!(next.single.record(), Some(&issue(2, "draft")));
    }

    #[test]
    fn test_shared_event_reaches_both() {
        let reducer = reducer();
        let state = reducer.reduce(
            &Arc::default(),
            &ResourceEvent::list_succeeded(vec![issue(5, "x")]),
        );
        let state = reducer.reduce(&state, &ResourceEvent::FetchOneSucceeded(issue(5, "x")));

        let state = reducer.reduce(&state, &ResourceEvent::UpdateSucceeded(issue(5, "y")));
        assert_eq!(state.list.get(&5), Some(&issue(5, "y")));
        assert_eq!(state.single.record(), Some(&issue(5, "y")));
    }

    #[test]
    fn test_delete_reaches_both() {
        let reducer = reducer();
        let state = reducer.reduce(
            &Arc::default(),
            &ResourceEvent::list_succeeded(vec![issue(5, "x"), issue(6, "y")]),
        );
        let state = reducer.reduce(&state, &ResourceEvent::FetchOneSucceeded(issue(5, "x")));
        let state = reducer.reduce(&state, &ResourceEvent::Requested(Operation::Delete));

        let state = reducer.reduce(&state, &ResourceEvent::DeleteSucceeded(6));
        assert_eq!(state.list.ids(), &[5]);
        assert_eq!(state.list.status(), RequestStatus::Succeeded);
        assert_eq!(state.single.record(), None);
        assert_eq!(state.single.status(), RequestStatus::Succeeded);
    }

    #[test]
    fn test_decode_covers_every_bound_event() {
        let reducer = reducer();

        let action =
            Action::with_payload("ISSUES_FETCH_ONE_SUCCEEDED", json!({"id": 5, "name": "x"}));
        let event = reducer.decode(&action).unwrap();
        assert_eq!(event, Some(ResourceEvent::FetchOneSucceeded(issue(5, "x"))));

        let event = reducer.decode(&Action::new("ISSUES_RESET")).unwrap();
        assert_eq!(event, Some(ResourceEvent::Reset));

        assert_eq!(reducer.decode(&Action::new("PEOPLE_RESET")).unwrap(), None);
    }

    #[test]
    fn test_unknown_action_returns_same_slice() {
        let reducer = reducer();
        let state: Arc<ResourceSlice<Issue>> = Arc::default();

        let next = reducer
            .reduce_action(&state, &Action::with_payload("PEOPLE_LIST_SUCCEEDED", json!([])))
            .unwrap();
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_decode_error_leaves_state() {
        let reducer = reducer();
        let state: Arc<ResourceSlice<Issue>> = Arc::default();

        let result = reducer.reduce_action(&state, &Action::new("ISSUES_UPDATE_SUCCEEDED"));
        assert!(result.is_err());
        assert_eq!(state.list.status(), RequestStatus::Idle);
    }

    #[test]
    fn test_serialize_slice() {
        let reducer = reducer();
        let state =
            reducer.reduce(&Arc::default(), &ResourceEvent::FetchOneSucceeded(issue(5, "x")));

        let value = serde_json::to_value(&*state).unwrap();
        assert_eq!(value["single"]["record"], json!({"id": 5, "name": "x"}));
        assert_eq!(value["list"]["status"], json!("idle"));
    }
}
