//! Multi-plan runner
//!
//! When planning produced several viable solutions, they race: each
//! candidate advances in round-robin for a bounded trial period, the
//! most productive one wins, and the winner's buffered results are
//! replayed before its tree continues. Losing candidates are discarded
//! at the end of the trial.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{Collection, RunnerId};
use crate::exec::{PlanStage, RecordId, StageState, WorkingSet};
use crate::query::{CanonicalQuery, Namespace};
use crate::solution::QuerySolution;

use super::runner::{drive_stage, ExplainSummary, Fetched, InvalidationKind, Runner, RunnerKind};

/// Upper bound on trial rounds before a winner is forced
const TRIAL_PERIOD_WORKS: u32 = 10_000;

/// One racing candidate
struct CandidatePlan {
    solution: QuerySolution,
    root: Box<dyn PlanStage>,
    ws: WorkingSet,
    buffered: VecDeque<(Value, Option<RecordId>)>,
    advanced: u64,
    works: u64,
    hit_eof: bool,
    dead: bool,
}

impl CandidatePlan {
    /// Productivity score, highest wins. An EOF during the trial means
    /// the whole result set was produced and beats any partial plan.
    fn score(&self) -> f64 {
        if self.dead {
            return 0.0;
        }
        let productivity = if self.works == 0 {
            0.0
        } else {
            self.advanced as f64 / self.works as f64
        };
        let eof_bonus = if self.hit_eof { 1.0 } else { 0.0 };
        1.0 + productivity + eof_bonus
    }
}

/// Runner that races N candidate solutions and executes the winner
pub struct MultiPlanRunner {
    id: RunnerId,
    collection: Arc<Collection>,
    ns: Namespace,
    _query: CanonicalQuery,
    candidates: Vec<CandidatePlan>,
    winner: Option<usize>,
    killed: bool,
}

impl std::fmt::Debug for MultiPlanRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiPlanRunner")
            .field("id", &self.id)
            .field("ns", &self.ns)
            .field("winner", &self.winner)
            .field("killed", &self.killed)
            .finish()
    }
}

impl MultiPlanRunner {
    /// Takes ownership of the canonical query
    pub fn new(collection: Arc<Collection>, query: CanonicalQuery) -> Self {
        let ns = query.ns().clone();
        Self {
            id: RunnerId::new(),
            collection,
            ns,
            _query: query,
            candidates: Vec::new(),
            winner: None,
            killed: false,
        }
    }

    /// Attaches a candidate; ownership of the solution and its tree
    /// transfers to the runner
    pub fn add_candidate(
        &mut self,
        solution: QuerySolution,
        root: Box<dyn PlanStage>,
        ws: WorkingSet,
    ) {
        self.candidates.push(CandidatePlan {
            solution,
            root,
            ws,
            buffered: VecDeque::new(),
            advanced: 0,
            works: 0,
            hit_eof: false,
            dead: false,
        });
    }

    /// Number of attached candidates
    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// The winning solution, once the trial has run
    pub fn winner_solution(&self) -> Option<&QuerySolution> {
        self.winner.map(|i| &self.candidates[i].solution)
    }

    /// Round-robin trial: every live candidate works once per round
    /// until one reaches EOF, all die, or the budget runs out.
    fn pick_best_plan(&mut self) -> usize {
        'trial: for _ in 0..TRIAL_PERIOD_WORKS {
            let mut any_alive = false;
            for candidate in self.candidates.iter_mut() {
                if candidate.dead || candidate.hit_eof {
                    continue;
                }
                any_alive = true;
                candidate.works += 1;
                match candidate.root.work(&mut candidate.ws) {
                    StageState::Advanced(slot) => {
                        if let Some(member) = candidate.ws.take(slot) {
                            if let Some(doc) = member.doc {
                                candidate.buffered.push_back((doc, member.record_id));
                                candidate.advanced += 1;
                            } else {
                                candidate.dead = true;
                            }
                        }
                    }
                    StageState::NeedTime => {}
                    StageState::Eof => {
                        candidate.hit_eof = true;
                        break 'trial;
                    }
                    StageState::Dead => {
                        candidate.dead = true;
                    }
                }
            }
            if !any_alive {
                break;
            }
        }

        let mut best = 0;
        let mut best_score = f64::MIN;
        for (i, candidate) in self.candidates.iter().enumerate() {
            let score = candidate.score();
            if score > best_score {
                best = i;
                best_score = score;
            }
        }

        // Losers' buffers are dead weight from here on
        for (i, candidate) in self.candidates.iter_mut().enumerate() {
            if i != best {
                candidate.buffered.clear();
            }
        }
        best
    }
}

impl Runner for MultiPlanRunner {
    fn kind(&self) -> RunnerKind {
        RunnerKind::MultiPlan
    }

    fn id(&self) -> RunnerId {
        self.id
    }

    fn get_next(&mut self) -> Fetched {
        if self.killed {
            return Fetched::Dead;
        }
        if self.candidates.is_empty() {
            return Fetched::Dead;
        }
        let winner = match self.winner {
            Some(i) => i,
            None => {
                let i = self.pick_best_plan();
                self.winner = Some(i);
                i
            }
        };

        let candidate = &mut self.candidates[winner];
        if let Some((doc, record_id)) = candidate.buffered.pop_front() {
            return Fetched::Advanced { doc, record_id };
        }
        if candidate.dead {
            return Fetched::Dead;
        }
        if candidate.hit_eof {
            return Fetched::Eof;
        }
        drive_stage(candidate.root.as_mut(), &mut candidate.ws)
    }

    fn save_state(&mut self) {
        for candidate in self.candidates.iter_mut() {
            candidate.root.save_state();
        }
    }

    fn restore_state(&mut self) {
        for candidate in self.candidates.iter_mut() {
            candidate.root.restore_state();
        }
    }

    fn invalidate(&mut self, record_id: RecordId, kind: InvalidationKind) {
        // Buffered rows holding the doomed location lose their record
        // id on deletion; the document itself was already materialized.
        if kind == InvalidationKind::Deletion {
            for candidate in self.candidates.iter_mut() {
                for row in candidate.buffered.iter_mut() {
                    if row.1 == Some(record_id) {
                        row.1 = None;
                    }
                }
            }
        }
    }

    fn kill(&mut self) {
        self.killed = true;
    }

    fn collection(&self) -> Option<&Arc<Collection>> {
        Some(&self.collection)
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }

    fn explain(&self) -> ExplainSummary {
        ExplainSummary {
            strategy: self.kind().as_str(),
            ns: self.ns.to_string(),
            solution: self.winner_solution().map(|s| s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ParsedOptions;
    use crate::solution::{CollScanNode, QuerySolutionNode};
    use serde_json::json;

    /// Emits `total` rows, one per `per_row_works` work calls
    struct PacedStage {
        total: u64,
        emitted: u64,
        per_row_works: u32,
        stalls: u32,
    }

    impl PacedStage {
        fn new(total: u64, per_row_works: u32) -> Self {
            Self {
                total,
                emitted: 0,
                per_row_works,
                stalls: 0,
            }
        }
    }

    impl PlanStage for PacedStage {
        fn work(&mut self, ws: &mut WorkingSet) -> StageState {
            if self.emitted >= self.total {
                return StageState::Eof;
            }
            if self.stalls + 1 < self.per_row_works {
                self.stalls += 1;
                return StageState::NeedTime;
            }
            self.stalls = 0;
            self.emitted += 1;
            let id = ws.allocate();
            ws.get_mut(id).expect("fresh slot").doc = Some(json!({"n": self.emitted}));
            StageState::Advanced(id)
        }
    }

    fn collscan_solution() -> QuerySolution {
        QuerySolution::new(QuerySolutionNode::CollScan(CollScanNode {
            direction: 1,
            filter: None,
            tailable: false,
        }))
    }

    fn make_runner() -> MultiPlanRunner {
        let query = CanonicalQuery::canonicalize(
            Namespace::new("db.c"),
            json!({"a": 1}),
            ParsedOptions::default(),
        )
        .unwrap();
        MultiPlanRunner::new(Arc::new(Collection::new(Namespace::new("db.c"))), query)
    }

    #[test]
    fn test_faster_candidate_wins() {
        let mut runner = make_runner();
        // Slow plan: a row every 10 works. Fast plan: a row every work.
        runner.add_candidate(
            collscan_solution(),
            Box::new(PacedStage::new(3, 10)),
            WorkingSet::new(),
        );
        runner.add_candidate(
            collscan_solution(),
            Box::new(PacedStage::new(3, 1)),
            WorkingSet::new(),
        );

        let mut rows = 0;
        while let Fetched::Advanced { .. } = runner.get_next() {
            rows += 1;
        }
        // The fast plan reaches EOF during the trial with all 3 rows
        assert_eq!(rows, 3);
        assert!(runner.winner_solution().is_some());
    }

    #[test]
    fn test_buffered_results_replayed_once() {
        let mut runner = make_runner();
        runner.add_candidate(
            collscan_solution(),
            Box::new(PacedStage::new(2, 1)),
            WorkingSet::new(),
        );
        runner.add_candidate(
            collscan_solution(),
            Box::new(PacedStage::new(2, 5)),
            WorkingSet::new(),
        );

        let mut docs = Vec::new();
        while let Fetched::Advanced { doc, .. } = runner.get_next() {
            docs.push(doc["n"].as_i64().unwrap());
        }
        assert_eq!(docs, vec![1, 2]);
        assert_eq!(runner.get_next(), Fetched::Eof);
    }

    #[test]
    fn test_no_candidates_is_dead() {
        let mut runner = make_runner();
        assert_eq!(runner.get_next(), Fetched::Dead);
    }
}
