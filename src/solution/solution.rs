//! Query solutions
//!
//! A solution owns its node tree exclusively. The `has_sort_stage` flag
//! is computed from the tree at construction and kept by rewrites that
//! do not introduce or remove sort nodes.

use std::fmt;

use super::node::QuerySolutionNode;

/// Reconstruction info the plan cache can persist for a solution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionCacheData {
    /// Whether an index filter narrowed the planner's index choices
    /// when this solution was produced
    pub index_filter_applied: bool,
}

/// A candidate execution strategy for one canonical query
#[derive(Debug, Clone)]
pub struct QuerySolution {
    /// Root of the owned node tree
    pub root: QuerySolutionNode,
    /// Whether the tree contains a blocking sort
    pub has_sort_stage: bool,
    /// Cache reconstruction info; absent for uncacheable solutions
    pub cache_data: Option<SolutionCacheData>,
}

impl QuerySolution {
    /// Wraps a node tree, computing the sort-stage flag
    pub fn new(root: QuerySolutionNode) -> Self {
        let has_sort_stage = root.has_blocking_sort();
        Self {
            root,
            has_sort_stage,
            cache_data: None,
        }
    }

    /// Wraps a node tree and attaches default cache data
    pub fn cacheable(root: QuerySolutionNode) -> Self {
        let mut solution = Self::new(root);
        solution.cache_data = Some(SolutionCacheData::default());
        solution
    }
}

impl fmt::Display for QuerySolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
