//! Pure reducers over resource state.
//!
//! Every reducer takes the current state behind an `Arc` and returns either
//! the same `Arc` (event not relevant, or no observable change) or a freshly
//! built state. State is never mutated in place, so readers holding an older
//! snapshot are unaffected and `Arc::ptr_eq` doubles as change detection.

mod collection;
mod single;
mod slice;

pub use collection::{CollectionReducer, CollectionState};
pub use single::{SingleReducer, SingleState};
pub use slice::{combine, ResourceReducer, ResourceSlice};
