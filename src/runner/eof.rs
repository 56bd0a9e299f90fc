//! EOF runner
//!
//! Returned when the target collection does not exist: dispatch
//! succeeds, and the runner reports end-of-stream forever while still
//! exposing the requested namespace.

use std::sync::Arc;

use crate::catalog::{Collection, RunnerId};
use crate::exec::RecordId;
use crate::query::{CanonicalQuery, Namespace};

use super::runner::{ExplainSummary, Fetched, InvalidationKind, Runner, RunnerKind};

/// Always-empty runner for an absent collection
pub struct EofRunner {
    id: RunnerId,
    ns: Namespace,
    // Owned so the query's lifetime matches every other variant
    _query: CanonicalQuery,
    killed: bool,
}

impl std::fmt::Debug for EofRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EofRunner")
            .field("id", &self.id)
            .field("ns", &self.ns)
            .field("killed", &self.killed)
            .finish()
    }
}

impl EofRunner {
    /// Takes ownership of the canonical query
    pub fn new(query: CanonicalQuery) -> Self {
        Self {
            id: RunnerId::new(),
            ns: query.ns().clone(),
            _query: query,
            killed: false,
        }
    }
}

impl Runner for EofRunner {
    fn kind(&self) -> RunnerKind {
        RunnerKind::Eof
    }

    fn id(&self) -> RunnerId {
        self.id
    }

    fn get_next(&mut self) -> Fetched {
        if self.killed {
            Fetched::Dead
        } else {
            Fetched::Eof
        }
    }

    fn save_state(&mut self) {}

    fn restore_state(&mut self) {}

    fn invalidate(&mut self, _record_id: RecordId, _kind: InvalidationKind) {}

    fn kill(&mut self) {
        self.killed = true;
    }

    fn collection(&self) -> Option<&Arc<Collection>> {
        None
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }

    fn explain(&self) -> ExplainSummary {
        ExplainSummary {
            strategy: self.kind().as_str(),
            ns: self.ns.to_string(),
            solution: None,
        }
    }
}
