//! Execution seams consumed by the dispatch core
//!
//! The working set (per-query scratchpad) and the stage-builder
//! interface. Stage execution itself is external; runners only drive
//! the trees the builder hands them.

mod stage;
mod working_set;

pub use stage::{PlanStage, StageBuildError, StageBuilder, StageState};
pub use working_set::{
    RecordId, WorkingSet, WorkingSetId, WorkingSetMember, INVALID_WORKING_SET_ID,
};
