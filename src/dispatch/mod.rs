//! Query execution dispatch
//!
//! The entry point between the query layer and the storage/execution
//! layers: given a canonical query and a collection, choose an
//! execution strategy and hand back a runner. Fast paths first, then
//! the plan cache, then the planner with the count/distinct rewrites
//! and multi-plan fallback.

mod config;
mod count;
mod distinct;
mod errors;
mod get_runner;
mod params;

pub use config::DispatchConfig;
pub use errors::{DispatchError, DispatchErrorCode, DispatchResult, Severity};
pub use get_runner::Dispatcher;
pub use params::fill_out_planner_params;
