//! Count rewrite: fetch(ixscan) → count
//!
//! A count over a predicate that an index scan answers with a single
//! key range never needs the documents themselves; the rewrite replaces
//! the fetch+ixscan pair with an in-index count node over the resolved
//! `[start_key, end_key]` range.

use crate::index::as_single_interval;
use crate::solution::{CountNode, QuerySolution, QuerySolutionNode};

/// Attempts the count rewrite on a solution root.
///
/// Succeeds iff the root is a filter-free FETCH over a filter-free,
/// non-simple-range IXSCAN whose bounds reduce to a single interval.
/// On success the old subtree is consumed and destroyed, and the
/// solution is marked uncacheable.
pub fn turn_ixscan_into_count(solution: &mut QuerySolution) -> bool {
    let count = {
        let QuerySolutionNode::Fetch(fetch) = &solution.root else {
            return false;
        };
        if fetch.filter.is_some() {
            return false;
        }
        let QuerySolutionNode::IxScan(scan) = fetch.child.as_ref() else {
            return false;
        };
        if scan.filter.is_some() || scan.is_simple_range {
            return false;
        }
        let Some(interval) = as_single_interval(&scan.bounds) else {
            return false;
        };
        CountNode {
            index_key_pattern: scan.index_key_pattern.clone(),
            start_key: interval.start_key,
            start_inclusive: interval.start_inclusive,
            end_key: interval.end_key,
            end_inclusive: interval.end_inclusive,
        }
    };

    // Installs the count node; the fetch+ixscan subtree drops here
    solution.root = QuerySolutionNode::Count(count);
    // A rewritten count solution is never cached
    solution.cache_data = None;
    true
}
