//! Plan-cache interface
//!
//! The cache maps canonical-query shapes to previously chosen solution
//! skeletons. Maintenance (insertion, eviction) is external; the
//! dispatch core only asks whether a query is cacheable and reads.

use crate::query::CanonicalQuery;

/// Opaque handle to a cached plan entry. The planner's
/// `plan_from_cache` knows how to turn it back into solutions; the
/// dispatcher never looks inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSolution {
    /// The shape key the entry was stored under
    pub key: String,
}

impl CachedSolution {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Read interface of a per-collection plan cache
pub trait PlanCache: Send + Sync {
    /// Whether this query's shape participates in caching at all
    fn should_cache(&self, query: &CanonicalQuery) -> bool;

    /// Looks up an entry for the query's shape
    fn get(&self, query: &CanonicalQuery) -> Option<CachedSolution>;
}

/// A cache that never hits; the default for collections without one
#[derive(Debug, Default)]
pub struct NeverCached;

impl PlanCache for NeverCached {
    fn should_cache(&self, _query: &CanonicalQuery) -> bool {
        false
    }

    fn get(&self, _query: &CanonicalQuery) -> Option<CachedSolution> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CanonicalQuery, Namespace, ParsedOptions};
    use serde_json::json;

    #[test]
    fn test_never_cached_misses() {
        let cq = CanonicalQuery::canonicalize(
            Namespace::new("db.c"),
            json!({"a": 1}),
            ParsedOptions::default(),
        )
        .unwrap();

        let cache = NeverCached;
        assert!(!cache.should_cache(&cq));
        assert!(cache.get(&cq).is_none());
    }
}
