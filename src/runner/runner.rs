//! The runner interface
//!
//! A runner is the opaque iterator the dispatcher hands back: it owns
//! its canonical query and whatever solutions and stage trees it drives.
//! The variant set is closed; `kind()` lets callers match on it.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::catalog::{Collection, RunnerId};
use crate::exec::{PlanStage, RecordId, StageState, WorkingSet};
use crate::query::Namespace;

/// Runner variant tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerKind {
    Eof,
    IdHack,
    SingleSolution,
    CachedPlan,
    MultiPlan,
}

impl RunnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerKind::Eof => "EOF",
            RunnerKind::IdHack => "IDHACK",
            RunnerKind::SingleSolution => "SINGLE_SOLUTION",
            RunnerKind::CachedPlan => "CACHED_PLAN",
            RunnerKind::MultiPlan => "MULTI_PLAN",
        }
    }
}

/// Outcome of one `get_next` call
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// A result document, with its storage location when known
    Advanced {
        doc: Value,
        record_id: Option<RecordId>,
    },
    /// End of stream
    Eof,
    /// The runner cannot produce further results
    Dead,
}

/// Why a storage location is being invalidated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationKind {
    /// The document is going away
    Deletion,
    /// The document is changing in place
    Mutation,
}

/// Dispatcher-facing explain output, serialized into client replies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainSummary {
    /// The runner variant, e.g. `IDHACK`
    pub strategy: &'static str,
    /// Namespace the runner reads
    pub ns: String,
    /// Rendered solution tree, for variants that have one
    pub solution: Option<String>,
}

/// The capability set every runner provides
pub trait Runner: std::fmt::Debug {
    /// The runner's variant tag
    fn kind(&self) -> RunnerKind;

    /// Registry identity of this runner
    fn id(&self) -> RunnerId;

    /// Produces the next result
    fn get_next(&mut self) -> Fetched;

    /// Prepare for a yield; no storage access until `restore_state`
    fn save_state(&mut self);

    /// Resume after a yield
    fn restore_state(&mut self);

    /// A storage location is becoming invalid
    fn invalidate(&mut self, record_id: RecordId, kind: InvalidationKind);

    /// Terminates the runner; subsequent `get_next` reports `Dead`
    fn kill(&mut self);

    /// The collection the runner reads, absent for the EOF variant
    fn collection(&self) -> Option<&Arc<Collection>>;

    /// Namespace the runner was dispatched against
    fn ns(&self) -> &Namespace;

    /// Explain summary for diagnostics
    fn explain(&self) -> ExplainSummary;
}

/// Drives a stage tree until it yields a row or terminates.
///
/// An advanced slot must carry a materialized document; a stage that
/// advances without one has broken its contract and the runner reports
/// `Dead` rather than fabricating output.
pub(crate) fn drive_stage(root: &mut dyn PlanStage, ws: &mut WorkingSet) -> Fetched {
    loop {
        match root.work(ws) {
            StageState::Advanced(id) => {
                let Some(member) = ws.take(id) else {
                    return Fetched::Dead;
                };
                let Some(doc) = member.doc else {
                    return Fetched::Dead;
                };
                return Fetched::Advanced {
                    doc,
                    record_id: member.record_id,
                };
            }
            StageState::NeedTime => continue,
            StageState::Eof => return Fetched::Eof,
            StageState::Dead => return Fetched::Dead,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;

    struct RowStage {
        rows: VecDeque<Value>,
        stall_first: bool,
    }

    impl PlanStage for RowStage {
        fn work(&mut self, ws: &mut WorkingSet) -> StageState {
            if self.stall_first {
                self.stall_first = false;
                return StageState::NeedTime;
            }
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

    #[test]
    fn test_drive_skips_need_time() {
        let mut stage = RowStage {
            rows: VecDeque::from([json!({"a": 1})]),
            stall_first: true,
        };
        let mut ws = WorkingSet::new();

        match drive_stage(&mut stage, &mut ws) {
            Fetched::Advanced { doc, .. } => assert_eq!(doc["a"], 1),
            other => panic!("expected a row, got {:?}", other),
        }
        assert_eq!(drive_stage(&mut stage, &mut ws), Fetched::Eof);
    }

    #[test]
    fn test_advanced_without_doc_is_dead() {
        struct BrokenStage;
        impl PlanStage for BrokenStage {
            fn work(&mut self, ws: &mut WorkingSet) -> StageState {
                StageState::Advanced(ws.allocate())
            }
        }

        let mut ws = WorkingSet::new();
        assert_eq!(drive_stage(&mut BrokenStage, &mut ws), Fetched::Dead);
    }
}
