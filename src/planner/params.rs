//! Planner parameters
//!
//! The input bundle the dispatcher assembles for the planner: an option
//! bitset, the usable index entries, an optional shard key, and whether
//! an index filter narrowed the entries.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::index::{IndexEntry, KeyPattern};

/// Composable planner option bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlannerOptions(u32);

impl PlannerOptions {
    /// No options
    pub const DEFAULT: PlannerOptions = PlannerOptions(0);
    /// Fail to plan rather than fall back to a collection scan
    pub const NO_TABLE_SCAN: PlannerOptions = PlannerOptions(1);
    /// Consider a collection scan alongside index plans
    pub const INCLUDE_COLLSCAN: PlannerOptions = PlannerOptions(1 << 1);
    /// Insert a shard-filter stage over every plan
    pub const INCLUDE_SHARD_FILTER: PlannerOptions = PlannerOptions(1 << 2);
    /// Consider index-intersection plans
    pub const INDEX_INTERSECTION: PlannerOptions = PlannerOptions(1 << 3);
    /// Keep documents that mutate out of the predicate mid-scan
    pub const KEEP_MUTATIONS: PlannerOptions = PlannerOptions(1 << 4);
    /// Internal: the query is a count; never set by user-facing callers
    pub const PRIVATE_IS_COUNT: PlannerOptions = PlannerOptions(1 << 5);

    /// Returns true if every bit of `other` is set
    pub fn contains(&self, other: PlannerOptions) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the bits of `other`
    pub fn set(&mut self, other: PlannerOptions) {
        self.0 |= other.0;
    }

    /// Clears the bits of `other`
    pub fn clear(&mut self, other: PlannerOptions) {
        self.0 &= !other.0;
    }
}

impl BitOr for PlannerOptions {
    type Output = PlannerOptions;

    fn bitor(self, rhs: PlannerOptions) -> PlannerOptions {
        PlannerOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for PlannerOptions {
    fn bitor_assign(&mut self, rhs: PlannerOptions) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for PlannerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (PlannerOptions::NO_TABLE_SCAN, "NO_TABLE_SCAN"),
            (PlannerOptions::INCLUDE_COLLSCAN, "INCLUDE_COLLSCAN"),
            (PlannerOptions::INCLUDE_SHARD_FILTER, "INCLUDE_SHARD_FILTER"),
            (PlannerOptions::INDEX_INTERSECTION, "INDEX_INTERSECTION"),
            (PlannerOptions::KEEP_MUTATIONS, "KEEP_MUTATIONS"),
            (PlannerOptions::PRIVATE_IS_COUNT, "PRIVATE_IS_COUNT"),
        ];
        let mut first = true;
        for (bit, name) in names {
            if self.contains(bit) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        if first {
            write!(f, "DEFAULT")?;
        }
        Ok(())
    }
}

/// The planner's input bundle
#[derive(Debug, Clone, Default)]
pub struct QueryPlannerParams {
    /// Option bitset
    pub options: PlannerOptions,
    /// Indexes the planner may use, snapshotted from the catalog
    pub indices: Vec<IndexEntry>,
    /// Shard key pattern, when shard filtering was requested and the
    /// collection is sharded
    pub shard_key: Option<KeyPattern>,
    /// Whether a query-settings index filter narrowed `indices`; when
    /// set, the planner ignores hints
    pub index_filters_applied: bool,
}
