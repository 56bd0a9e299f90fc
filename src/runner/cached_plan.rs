//! Cached-plan runner
//!
//! Drives a solution rebuilt from the plan cache. When the cache also
//! supplied a backup solution, the runner falls back to it if the
//! cached plan dies before returning any results.

use std::sync::Arc;

use crate::catalog::{Collection, RunnerId};
use crate::exec::{PlanStage, RecordId, WorkingSet};
use crate::query::{CanonicalQuery, Namespace};
use crate::solution::QuerySolution;

use super::runner::{drive_stage, ExplainSummary, Fetched, InvalidationKind, Runner, RunnerKind};

/// One solution with its executable tree
struct PlannedTree {
    pub solution: QuerySolution,
    pub root: Box<dyn PlanStage>,
    pub ws: WorkingSet,
}

/// Runner over a cached solution, with an optional backup plan
pub struct CachedPlanRunner {
    id: RunnerId,
    collection: Arc<Collection>,
    ns: Namespace,
    _query: CanonicalQuery,
    primary: PlannedTree,
    backup: Option<PlannedTree>,
    using_backup: bool,
    advanced_any: bool,
    killed: bool,
}

impl std::fmt::Debug for CachedPlanRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedPlanRunner")
            .field("id", &self.id)
            .field("ns", &self.ns)
            .field("using_backup", &self.using_backup)
            .field("advanced_any", &self.advanced_any)
            .field("killed", &self.killed)
            .finish()
    }
}

impl CachedPlanRunner {
    /// Takes ownership of the query and both plans
    pub fn new(
        collection: Arc<Collection>,
        query: CanonicalQuery,
        primary_solution: QuerySolution,
        primary_root: Box<dyn PlanStage>,
        primary_ws: WorkingSet,
        backup: Option<(QuerySolution, Box<dyn PlanStage>, WorkingSet)>,
    ) -> Self {
        let ns = query.ns().clone();
        Self {
            id: RunnerId::new(),
            collection,
            ns,
            _query: query,
            primary: PlannedTree {
                solution: primary_solution,
                root: primary_root,
                ws: primary_ws,
            },
            backup: backup.map(|(solution, root, ws)| PlannedTree { solution, root, ws }),
            using_backup: false,
            advanced_any: false,
            killed: false,
        }
    }

    /// Returns true if a backup plan is attached
    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// Returns true once the runner has switched to the backup plan
    pub fn using_backup(&self) -> bool {
        self.using_backup
    }

    fn current(&mut self) -> &mut PlannedTree {
        if self.using_backup {
            self.backup.as_mut().expect("backup selected but absent")
        } else {
            &mut self.primary
        }
    }
}

impl Runner for CachedPlanRunner {
    fn kind(&self) -> RunnerKind {
        RunnerKind::CachedPlan
    }

    fn id(&self) -> RunnerId {
        self.id
    }

    fn get_next(&mut self) -> Fetched {
        if self.killed {
            return Fetched::Dead;
        }
        let tree = if self.using_backup {
            self.backup.as_mut().expect("backup selected but absent")
        } else {
            &mut self.primary
        };
        match drive_stage(tree.root.as_mut(), &mut tree.ws) {
            Fetched::Dead if !self.using_backup && !self.advanced_any && self.backup.is_some() => {
                // The cached plan failed before producing anything;
                // route around it once.
                self.using_backup = true;
                let backup = self.backup.as_mut().expect("backup present");
                let fetched = drive_stage(backup.root.as_mut(), &mut backup.ws);
                if matches!(fetched, Fetched::Advanced { .. }) {
                    self.advanced_any = true;
                }
                fetched
            }
            fetched => {
                if matches!(fetched, Fetched::Advanced { .. }) {
                    self.advanced_any = true;
                }
                fetched
            }
        }
    }

    fn save_state(&mut self) {
        self.current().root.save_state();
    }

    fn restore_state(&mut self) {
        self.current().root.restore_state();
    }

    fn invalidate(&mut self, _record_id: RecordId, _kind: InvalidationKind) {}

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
        let tree = if self.using_backup {
            self.backup.as_ref().expect("backup selected but absent")
        } else {
            &self.primary
        };
        ExplainSummary {
            strategy: self.kind().as_str(),
            ns: self.ns.to_string(),
            solution: Some(tree.solution.to_string()),
        }
    }
}
