//! Planner boundary
//!
//! Everything the dispatch core exchanges with the external query
//! planner: the params bundle it assembles, the capability trait it
//! calls, and the plan-cache read interface it consults first.

mod cache;
mod params;
mod provider;

pub use cache::{CachedSolution, NeverCached, PlanCache};
pub use params::{PlannerOptions, QueryPlannerParams};
pub use provider::{CachedPlans, PlanError, PlanProvider};
