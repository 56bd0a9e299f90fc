//! Collection catalog surface
//!
//! The read interfaces the dispatch core consumes: collection metadata,
//! per-collection query settings and plan cache, the cursor registry,
//! and the sharding seam.

mod collection;
mod cursors;
mod settings;
mod sharding;

pub use collection::{
    Collection, CollectionInfoCache, DocumentStore, EmptyStore, IndexDescriptor,
};
pub use cursors::{CursorRegistry, CursorSlot, RunnerId};
pub use settings::{AllowedIndices, QuerySettings};
pub use sharding::{ShardingCatalog, Unsharded};
