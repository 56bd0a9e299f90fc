//! Planner capability interface
//!
//! The cost-based planner is external to the dispatch core. The core
//! consumes it through this trait so tests can substitute deterministic
//! doubles.

use thiserror::Error;

use crate::query::CanonicalQuery;
use crate::solution::{QuerySolution, QuerySolutionNode};

use super::cache::CachedSolution;
use super::params::QueryPlannerParams;

/// Planner failure at the dispatch boundary
#[derive(Debug, Error)]
pub enum PlanError {
    /// Enumeration failed; surfaced to the caller as a bad value
    #[error("{0}")]
    Planning(String),
    /// A cached entry could not be turned back into a solution;
    /// swallowed by the dispatcher (treated as a cache miss)
    #[error("cached plan unusable: {0}")]
    CacheReplay(String),
}

/// Primary solution from the cache, plus an optional backup the runner
/// can fall back to
#[derive(Debug)]
pub struct CachedPlans {
    pub primary: QuerySolution,
    pub backup: Option<QuerySolution>,
}

/// The planner as the dispatch core sees it
pub trait PlanProvider {
    /// Enumerates candidate solutions for a query
    fn plan(
        &self,
        query: &CanonicalQuery,
        params: &QueryPlannerParams,
    ) -> Result<Vec<QuerySolution>, PlanError>;

    /// Rebuilds a solution (and possibly a backup) from a cache entry
    fn plan_from_cache(
        &self,
        query: &CanonicalQuery,
        params: &QueryPlannerParams,
        cached: &CachedSolution,
    ) -> Result<CachedPlans, PlanError>;

    /// Finishes a hand-built data-access tree into a full solution
    /// (sort/projection analysis). Returns `None` when the tree cannot
    /// satisfy the query.
    fn analyze(
        &self,
        query: &CanonicalQuery,
        params: &QueryPlannerParams,
        root: QuerySolutionNode,
    ) -> Option<QuerySolution>;
}
