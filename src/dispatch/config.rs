//! Dispatch configuration
//!
//! The process-wide knobs the dispatcher reads at call time, routed as
//! an explicit handle rather than ambient globals so tests can vary
//! them per call.

/// Tunables consulted on every dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Whether the planner may consider index-intersection plans
    pub enable_index_intersection: bool,
    /// Refuse collection scans except for exempt namespaces
    pub no_table_scan: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enable_index_intersection: true,
            no_table_scan: false,
        }
    }
}
