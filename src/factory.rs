//! Builds reducers for a resource type from its descriptor.

use crate::descriptor::ResourceDescriptor;
use crate::error::Result;
use crate::reducers::{combine, CollectionReducer, ResourceReducer, SingleReducer};
use crate::types::Resource;
use std::sync::Arc;

/// Entry point for turning a [`ResourceDescriptor`] into reducers.
pub struct StoreFactory;

impl StoreFactory {
    /// Validate `descriptor` and build the collection and single reducers.
    ///
    /// Fails if the descriptor is incomplete or binds an event name twice,
    /// so no lifecycle step can silently go unwired.
    pub fn build<R: Resource>(
        descriptor: &ResourceDescriptor,
    ) -> Result<(CollectionReducer<R>, SingleReducer<R>)> {
        let routes = Arc::new(descriptor.validate()?);
        Ok((
            CollectionReducer::new(Arc::clone(&routes)),
            SingleReducer::new(routes),
        ))
    }

    /// [`build`](Self::build) followed by [`combine`].
    pub fn build_combined<R: Resource>(
        descriptor: &ResourceDescriptor,
    ) -> Result<ResourceReducer<R>> {
        let (list, single) = Self::build(descriptor)?;
        Ok(combine(list, single))
    }
}
