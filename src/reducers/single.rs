//! Single focused record and its reducer.

use crate::descriptor::{EventRoutes, Operation};
use crate::error::Result;
use crate::events::ResourceEvent;
use crate::types::{Action, ErrorInfo, RequestStatus, Resource};
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// The focused record (e.g. the one open in an editor) and the status of
/// the last item-level request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SingleState<R> {
    record: Option<R>,
    status: RequestStatus,
    error: Option<ErrorInfo>,
}

impl<R> Default for SingleState<R> {
    fn default() -> Self {
        Self {
            record: None,
            status: RequestStatus::Idle,
            error: None,
        }
    }
}

impl<R: Resource> SingleState<R> {
    pub fn record(&self) -> Option<&R> {
        self.record.as_ref()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    fn is_pristine(&self) -> bool {
        self.record.is_none() && self.status == RequestStatus::Idle && self.error.is_none()
    }

    fn with_status(&self, status: RequestStatus, error: Option<ErrorInfo>) -> Self {
        Self {
            record: self.record.clone(),
            status,
            error,
        }
    }
}

/// Reducer for item-level operations: fetch-one, update, delete.
pub struct SingleReducer<R> {
    routes: Arc<EventRoutes>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for SingleReducer<R> {
    fn clone(&self) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
            _record: PhantomData,
        }
    }
}

impl<R: Resource> SingleReducer<R> {
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
        state: &Arc<SingleState<R>>,
        event: &ResourceEvent<R>,
    ) -> Arc<SingleState<R>> {
        match transition(state, event) {
            Some(next) if next != **state => Arc::new(next),
            _ => Arc::clone(state),
        }
    }

    /// Apply a wire action; unknown actions leave the state untouched.
    pub fn reduce_action(
        &self,
        state: &Arc<SingleState<R>>,
        action: &Action,
    ) -> Result<Arc<SingleState<R>>> {
        match self.routes.resolve(&action.event_type) {
            Some(kind) => Ok(self.reduce(state, &ResourceEvent::decode(kind, action)?)),
            None => Ok(Arc::clone(state)),
        }
    }
}

fn transition<R: Resource>(
    state: &SingleState<R>,
    event: &ResourceEvent<R>,
) -> Option<SingleState<R>> {
    use Operation::{Delete, FetchOne, Update};

    match event {
        ResourceEvent::Requested(FetchOne | Update | Delete) => {
            Some(state.with_status(RequestStatus::Pending, None))
        }
        ResourceEvent::Failed(FetchOne | Update | Delete, error) => {
            Some(state.with_status(RequestStatus::Failed, Some(error.clone())))
        }
        ResourceEvent::FetchOneSucceeded(record) | ResourceEvent::UpdateSucceeded(record) => {
            Some(SingleState {
                record: Some(record.clone()),
                status: RequestStatus::Succeeded,
                error: None,
            })
        }
        ResourceEvent::DeleteSucceeded(_) => Some(SingleState {
            record: None,
            status: RequestStatus::Succeeded,
            error: None,
        }),
        ResourceEvent::Set(record) => Some(SingleState {
            record: Some(record.clone()),
            status: state.status,
            error: state.error.clone(),
        }),
        ResourceEvent::Reset if !state.is_pristine() => Some(SingleState::default()),
        _ => None,
    }
}
