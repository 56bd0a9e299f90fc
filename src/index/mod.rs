//! Index key space for the dispatch core
//!
//! Key patterns, key values with MinKey/MaxKey sentinels, planner-visible
//! index entries, and the interval bounds an index scan traverses,
//! including the single-interval analysis the count rewrite relies on.

mod bounds;
mod entry;
mod keys;

pub use bounds::{
    as_single_interval, IndexBounds, Interval, OrderedIntervalList, SingleInterval,
};
pub use entry::{IndexEntry, IndexPlugin};
pub use keys::{IndexKey, KeyPattern, KeyValue};
