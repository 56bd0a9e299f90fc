//! Stage seam
//!
//! Stage execution lives outside the dispatch core. The core only needs
//! a way to turn a chosen solution into something a runner can drive:
//! the `StageBuilder` produces a `PlanStage` tree, the runner works it
//! against a working set.

use thiserror::Error;

use crate::query::CanonicalQuery;
use crate::solution::QuerySolution;

use super::working_set::{WorkingSet, WorkingSetId};

/// Result of one unit of stage work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageState {
    /// A row is available in the given working-set slot
    Advanced(WorkingSetId),
    /// Progress was made but no row is ready yet
    NeedTime,
    /// No more rows
    Eof,
    /// The stage cannot continue (invalidation, resource failure)
    Dead,
}

/// One stage of an executable plan tree
pub trait PlanStage {
    /// Performs one unit of work
    fn work(&mut self, ws: &mut WorkingSet) -> StageState;

    /// Prepare for a yield; no storage access until `restore_state`
    fn save_state(&mut self) {}

    /// Resume after a yield
    fn restore_state(&mut self) {}
}

/// Stage construction failure. The dispatch core treats this as fatal:
/// a solution the planner produced must always be buildable.
#[derive(Debug, Error)]
pub enum StageBuildError {
    #[error("unsupported solution shape: {0}")]
    UnsupportedShape(String),
    #[error("stage construction failed: {0}")]
    Internal(String),
}

/// Builds an executable stage tree for a chosen solution
pub trait StageBuilder {
    /// Builds the stage tree; the caller supplies the working set the
    /// tree will run against
    fn build(
        &self,
        query: &CanonicalQuery,
        solution: &QuerySolution,
    ) -> Result<Box<dyn PlanStage>, StageBuildError>;
}
