//! Single-solution runner
//!
//! Drives exactly one chosen solution's stage tree to completion.

use std::sync::Arc;

use crate::catalog::{Collection, RunnerId};
use crate::exec::{PlanStage, RecordId, WorkingSet};
use crate::query::{CanonicalQuery, Namespace};
use crate::solution::QuerySolution;

use super::runner::{drive_stage, ExplainSummary, Fetched, InvalidationKind, Runner, RunnerKind};

/// Runner over one solution
pub struct SingleSolutionRunner {
    id: RunnerId,
    collection: Option<Arc<Collection>>,
    ns: Namespace,
    _query: CanonicalQuery,
    solution: QuerySolution,
    root: Box<dyn PlanStage>,
    ws: WorkingSet,
    killed: bool,
}

impl std::fmt::Debug for SingleSolutionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleSolutionRunner")
            .field("id", &self.id)
            .field("ns", &self.ns)
            .field("killed", &self.killed)
            .finish()
    }
}

impl SingleSolutionRunner {
    /// Takes ownership of the query, the solution, and its stage tree
    pub fn new(
        collection: Option<Arc<Collection>>,
        query: CanonicalQuery,
        solution: QuerySolution,
        root: Box<dyn PlanStage>,
        ws: WorkingSet,
    ) -> Self {
        let ns = query.ns().clone();
        Self {
            id: RunnerId::new(),
            collection,
            ns,
            _query: query,
            solution,
            root,
            ws,
            killed: false,
        }
    }

    /// The solution this runner drives
    pub fn solution(&self) -> &QuerySolution {
        &self.solution
    }
}

impl Runner for SingleSolutionRunner {
    fn kind(&self) -> RunnerKind {
        RunnerKind::SingleSolution
    }

    fn id(&self) -> RunnerId {
        self.id
    }

    fn get_next(&mut self) -> Fetched {
        if self.killed {
            return Fetched::Dead;
        }
        drive_stage(self.root.as_mut(), &mut self.ws)
    }

    fn save_state(&mut self) {
        self.root.save_state();
    }

    fn restore_state(&mut self) {
        self.root.restore_state();
    }

    fn invalidate(&mut self, _record_id: RecordId, _kind: InvalidationKind) {
        // Stages own their scan positions; invalidation of buffered
        // rows is handled where the rows live.
    }

    fn kill(&mut self) {
        self.killed = true;
    }

    fn collection(&self) -> Option<&Arc<Collection>> {
        self.collection.as_ref()
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }

    fn explain(&self) -> ExplainSummary {
        ExplainSummary {
            strategy: self.kind().as_str(),
            ns: self.ns.to_string(),
            solution: Some(self.solution.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::StageState;
    use crate::query::ParsedOptions;
    use crate::solution::{CollScanNode, QuerySolutionNode};
    use serde_json::{json, Value};
    use std::collections::VecDeque;

    struct RowStage {
        rows: VecDeque<Value>,
    }

    impl PlanStage for RowStage {
        fn work(&mut self, ws: &mut WorkingSet) -> StageState {
            match self.rows.pop_front() {
                Some(doc) => {
                    let id = ws.allocate();
                    ws.get_mut(id).expect("fresh slot").doc = Some(doc);
                    StageState::Advanced(id)
                }
                None => StageState::Eof,
            }
        }
    }

    fn make_runner(rows: Vec<Value>) -> SingleSolutionRunner {
        let query = CanonicalQuery::canonicalize(
            Namespace::new("db.c"),
            json!({}),
            ParsedOptions::default(),
        )
        .unwrap();
        let solution = QuerySolution::new(QuerySolutionNode::CollScan(CollScanNode {
            direction: 1,
            filter: None,
            tailable: false,
        }));
        SingleSolutionRunner::new(
            None,
            query,
            solution,
            Box::new(RowStage { rows: rows.into() }),
            WorkingSet::new(),
        )
    }

    #[test]
    fn test_drains_solution_then_eof() {
        let mut runner = make_runner(vec![json!({"a": 1}), json!({"a": 2})]);

        let mut seen = Vec::new();
        while let Fetched::Advanced { doc, .. } = runner.get_next() {
            seen.push(doc["a"].as_i64().unwrap());
        }
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(runner.get_next(), Fetched::Eof);
    }

    #[test]
    fn test_explain_carries_solution() {
        let runner = make_runner(vec![]);
        let explain = runner.explain();
        assert_eq!(explain.strategy, "SINGLE_SOLUTION");
        assert_eq!(explain.solution.as_deref(), Some("COLLSCAN"));

        let reply = serde_json::to_value(&explain).unwrap();
        assert_eq!(reply["strategy"], "SINGLE_SOLUTION");
        assert_eq!(reply["ns"], "db.c");
    }

    #[test]
    fn test_kill_stops_iteration() {
        let mut runner = make_runner(vec![json!({"a": 1})]);
        runner.kill();
        assert_eq!(runner.get_next(), Fetched::Dead);
    }
}
