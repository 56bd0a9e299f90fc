//! Count entry point
//!
//! Canonicalizes the count predicate (with any hint), marks the
//! dispatch as a count internally, and lets the general ladder run; the
//! count rewrite then fires in step 8 or on the cache path.

use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{Collection, ShardingCatalog};
use crate::exec::StageBuilder;
use crate::planner::{PlanProvider, PlannerOptions};
use crate::query::{CanonicalQuery, Namespace, ParsedOptions};
use crate::runner::Runner;

use super::errors::DispatchResult;
use super::get_runner::Dispatcher;

impl<'a, P, B, S> Dispatcher<'a, P, B, S>
where
    P: PlanProvider,
    B: StageBuilder,
    S: ShardingCatalog,
{
    /// Dispatches a count. The `PRIVATE_IS_COUNT` bit is set here and
    /// only here; user-facing callers never pass it.
    pub fn get_runner_count(
        &self,
        collection: Option<&Arc<Collection>>,
        ns: &Namespace,
        raw_query: Value,
        hint: Option<crate::index::KeyPattern>,
    ) -> DispatchResult<Box<dyn Runner>> {
        let options = ParsedOptions {
            hint,
            ..ParsedOptions::default()
        };
        let query = CanonicalQuery::canonicalize(ns.clone(), raw_query, options)?;
        self.get_runner(collection, query, PlannerOptions::PRIVATE_IS_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Unsharded;
    use crate::dispatch::DispatchConfig;
    use crate::exec::{PlanStage, StageBuildError, StageState, WorkingSet};
    use crate::index::{
        IndexBounds, Interval, KeyPattern, KeyValue, OrderedIntervalList,
    };
    use crate::planner::{CachedPlans, CachedSolution, PlanError, QueryPlannerParams};
    use crate::runner::RunnerKind;
    use crate::solution::{
        FetchNode, IxScanNode, NodeKind, QuerySolution, QuerySolutionNode,
    };
    use serde_json::json;

    struct EofStage;

    impl PlanStage for EofStage {
        fn work(&mut self, _ws: &mut WorkingSet) -> StageState {
            StageState::Eof
        }
    }

    struct EofStageBuilder;

    impl StageBuilder for EofStageBuilder {
        fn build(
            &self,
            _query: &CanonicalQuery,
            _solution: &QuerySolution,
        ) -> Result<Box<dyn PlanStage>, StageBuildError> {
            Ok(Box::new(EofStage))
        }
    }

    struct CannedPlanner {
        solutions: Vec<QuerySolution>,
    }

    impl PlanProvider for CannedPlanner {
        fn plan(
            &self,
            _query: &CanonicalQuery,
            _params: &QueryPlannerParams,
        ) -> Result<Vec<QuerySolution>, PlanError> {
            Ok(self.solutions.clone())
        }

        fn plan_from_cache(
            &self,
            _query: &CanonicalQuery,
            _params: &QueryPlannerParams,
            _cached: &CachedSolution,
        ) -> Result<CachedPlans, PlanError> {
            Err(PlanError::CacheReplay("not cached".into()))
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

    /// fetch(ixscan) over {a:1,b:1,c:1} for {a: 2, b: {$gt: 3}}
    fn countable_solution() -> QuerySolution {
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

    #[test]
    fn test_count_rewrites_first_eligible_solution() {
        let planner = CannedPlanner {
            solutions: vec![countable_solution(), countable_solution()],
        };
        let dispatcher =
            Dispatcher::new(&planner, &EofStageBuilder, &Unsharded, DispatchConfig::default());
        let collection = Arc::new(Collection::new(Namespace::new("db.c")));

        let runner = dispatcher
            .get_runner_count(
                Some(&collection),
                &Namespace::new("db.c"),
                json!({"a": 2, "b": {"$gt": 3}}),
                None,
            )
            .unwrap();
        assert_eq!(runner.kind(), RunnerKind::SingleSolution);
        let explain = runner.explain();
        assert_eq!(explain.solution.as_deref(), Some(NodeKind::Count.as_str()));
    }

    #[test]
    fn test_count_on_missing_collection_is_eof() {
        let planner = CannedPlanner { solutions: vec![] };
        let dispatcher =
            Dispatcher::new(&planner, &EofStageBuilder, &Unsharded, DispatchConfig::default());

        let runner = dispatcher
            .get_runner_count(None, &Namespace::new("db.c"), json!({"a": 1}), None)
            .unwrap();
        assert_eq!(runner.kind(), RunnerKind::Eof);
    }

    #[test]
    fn test_unrewritable_count_still_runs() {
        // $in produces two intervals on the leading field; the rewrite
        // must fail and the plain solution runs instead
        let pattern = KeyPattern::ascending("a");
        let bounds = IndexBounds::new(vec![OrderedIntervalList::new(
            "a",
            vec![Interval::point(json!(1)), Interval::point(json!(2))],
        )]);
        let solution = QuerySolution::new(QuerySolutionNode::Fetch(FetchNode {
            child: Box::new(QuerySolutionNode::IxScan(IxScanNode {
                index_key_pattern: pattern,
                direction: 1,
                bounds,
                is_simple_range: false,
                filter: None,
            })),
            filter: None,
        }));
        let planner = CannedPlanner {
            solutions: vec![solution],
        };
        let dispatcher =
            Dispatcher::new(&planner, &EofStageBuilder, &Unsharded, DispatchConfig::default());
        let collection = Arc::new(Collection::new(Namespace::new("db.c")));

        let runner = dispatcher
            .get_runner_count(
                Some(&collection),
                &Namespace::new("db.c"),
                json!({"a": {"$in": [1, 2]}}),
                None,
            )
            .unwrap();
        assert_eq!(runner.kind(), RunnerKind::SingleSolution);
        let explain = runner.explain();
        assert_eq!(explain.solution.as_deref(), Some("FETCH(IXSCAN)"));
    }
}
