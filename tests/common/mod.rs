//! Shared doubles for the dispatch integration tests
#![allow(dead_code)]

use std::sync::Mutex;

use serde_json::{json, Value};

use stratadb::catalog::DocumentStore;
use stratadb::exec::{PlanStage, RecordId, StageBuildError, StageBuilder, StageState, WorkingSet};
use stratadb::index::{IndexBounds, Interval, KeyPattern, KeyValue, OrderedIntervalList};
use stratadb::planner::{
    CachedPlans, CachedSolution, PlanError, PlanProvider, QueryPlannerParams,
};
use stratadb::query::{CanonicalQuery, Namespace, ParsedOptions};
use stratadb::solution::{
    CollScanNode, FetchNode, IxScanNode, ProjectionNode, QuerySolution, QuerySolutionNode,
    SortNode,
};

/// A stage that immediately reports end-of-stream
pub struct EofStage;

impl PlanStage for EofStage {
    fn work(&mut self, _ws: &mut WorkingSet) -> StageState {
        StageState::Eof
    }
}

/// Stage builder that hands out EOF stages and records every solution
/// it was asked to build
#[derive(Default)]
pub struct RecordingStageBuilder {
    pub built: Mutex<Vec<QuerySolution>>,
}

impl RecordingStageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solutions built so far, in order
    pub fn solutions(&self) -> Vec<QuerySolution> {
        self.built.lock().unwrap().clone()
    }
}

impl StageBuilder for RecordingStageBuilder {
    fn build(
        &self,
        _query: &CanonicalQuery,
        solution: &QuerySolution,
    ) -> Result<Box<dyn PlanStage>, StageBuildError> {
        self.built.lock().unwrap().push(solution.clone());
        Ok(Box::new(EofStage))
    }
}

/// Planner double: canned `plan` solutions, canned cache replay,
/// trivial analysis
pub struct CannedPlanner {
    pub solutions: Vec<QuerySolution>,
    pub cached: Option<CachedReplay>,
    pub plan_calls: Mutex<u32>,
    pub seen_params: Mutex<Option<QueryPlannerParams>>,
}

/// What `plan_from_cache` should produce
pub struct CachedReplay {
    pub primary: QuerySolution,
    pub backup: Option<QuerySolution>,
}

impl CannedPlanner {
    pub fn with_solutions(solutions: Vec<QuerySolution>) -> Self {
        Self {
            solutions,
            cached: None,
            plan_calls: Mutex::new(0),
            seen_params: Mutex::new(None),
        }
    }

    pub fn with_cached(mut self, primary: QuerySolution, backup: Option<QuerySolution>) -> Self {
        self.cached = Some(CachedReplay { primary, backup });
        self
    }

    /// Number of times `plan` ran
    pub fn plan_calls(&self) -> u32 {
        *self.plan_calls.lock().unwrap()
    }

    /// Params of the last `plan` call
    pub fn last_params(&self) -> Option<QueryPlannerParams> {
        self.seen_params.lock().unwrap().clone()
    }
}

impl PlanProvider for CannedPlanner {
    fn plan(
        &self,
        _query: &CanonicalQuery,
        params: &QueryPlannerParams,
    ) -> Result<Vec<QuerySolution>, PlanError> {
        *self.plan_calls.lock().unwrap() += 1;
        *self.seen_params.lock().unwrap() = Some(params.clone());
        if self.solutions.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.solutions.clone())
    }

    fn plan_from_cache(
        &self,
        _query: &CanonicalQuery,
        _params: &QueryPlannerParams,
        _cached: &CachedSolution,
    ) -> Result<CachedPlans, PlanError> {
        match &self.cached {
            Some(replay) => Ok(CachedPlans {
                primary: replay.primary.clone(),
                backup: replay.backup.clone(),
            }),
            None => Err(PlanError::CacheReplay("no cached entry".into())),
        }
    }

    fn analyze(
        &self,
        _query: &CanonicalQuery,
        _params: &QueryPlannerParams,
        root: QuerySolutionNode,
    ) -> Option<QuerySolution> {
        Some(QuerySolution::new(root))
    }
}

/// Plan cache double that always hits with an opaque handle
pub struct AlwaysHitCache;

impl stratadb::planner::PlanCache for AlwaysHitCache {
    fn should_cache(&self, _query: &CanonicalQuery) -> bool {
        true
    }

    fn get(&self, query: &CanonicalQuery) -> Option<CachedSolution> {
        Some(CachedSolution::new(query.shape()))
    }
}

/// Store with a handful of documents keyed by `_id`
pub struct FixtureStore;

impl DocumentStore for FixtureStore {
    fn find_by_id(&self, id: &Value) -> Option<(RecordId, Value)> {
        let n = id.as_i64()?;
        (n < 100).then(|| (RecordId(n as u64), json!({"_id": n, "n": n})))
    }
}

pub fn make_query(ns: &str, filter: Value, options: ParsedOptions) -> CanonicalQuery {
    CanonicalQuery::canonicalize(Namespace::new(ns), filter, options).unwrap()
}

pub fn collscan_solution() -> QuerySolution {
    QuerySolution::cacheable(QuerySolutionNode::CollScan(CollScanNode {
        direction: 1,
        filter: None,
        tailable: false,
    }))
}

/// A solution whose tree blocks on a sort
pub fn sorted_solution() -> QuerySolution {
    QuerySolution::cacheable(QuerySolutionNode::Sort(SortNode {
        child: Box::new(QuerySolutionNode::CollScan(CollScanNode {
            direction: 1,
            filter: None,
            tailable: false,
        })),
        pattern: KeyPattern::ascending("a"),
    }))
}

/// fetch(ixscan) over `{a:1,b:1,c:1}` for `{a: 2, b: {$gt: 3}}`
pub fn countable_solution() -> QuerySolution {
    let pattern = KeyPattern::new(vec![("a".into(), 1), ("b".into(), 1), ("c".into(), 1)]);
    let bounds = IndexBounds::new(vec![
        OrderedIntervalList::single("a", Interval::point(json!(2))),
        OrderedIntervalList::single(
            "b",
            Interval::new(KeyValue::json(json!(3)), KeyValue::MaxKey, false, true),
        ),
        OrderedIntervalList::single("c", Interval::all_values()),
    ]);
    QuerySolution::new(QuerySolutionNode::Fetch(FetchNode {
        child: Box::new(QuerySolutionNode::IxScan(IxScanNode {
            index_key_pattern: pattern,
            direction: 1,
            bounds,
            is_simple_range: false,
            filter: None,
        })),
        filter: None,
    }))
}

/// projection(ixscan) over the given pattern, the shape the distinct
/// rewrite wants
pub fn coverable_distinct_solution(pattern: KeyPattern, field: &str) -> QuerySolution {
    let bounds = IndexBounds::all_values_over(&pattern);
    let mut projection = serde_json::Map::new();
    projection.insert("_id".to_string(), json!(0));
    projection.insert(field.to_string(), json!(1));
    QuerySolution::new(QuerySolutionNode::Projection(ProjectionNode {
        child: Box::new(QuerySolutionNode::IxScan(IxScanNode {
            index_key_pattern: pattern,
            direction: 1,
            bounds,
            is_simple_range: false,
            filter: None,
        })),
        projection: Value::Object(projection),
    }))
}
