//! Distinct entry point
//!
//! Two modes. With no predicate and a usable index, a distinct-scan
//! solution is synthesized directly and the planner is bypassed (mode
//! A). With a predicate, the planner runs over indexes prefixed by the
//! distinct field and the first solution that rewrites wins (mode B).
//! Anything else falls back to the general ladder.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::catalog::{Collection, ShardingCatalog};
use crate::exec::StageBuilder;
use crate::index::{IndexBounds, IndexEntry};
use crate::planner::{PlanProvider, PlannerOptions, QueryPlannerParams};
use crate::query::{CanonicalQuery, Namespace, ParsedOptions};
use crate::rewrite::turn_ixscan_into_distinct;
use crate::runner::{Runner, SingleSolutionRunner};
use crate::solution::{DistinctNode, QuerySolutionNode};

use super::errors::{DispatchError, DispatchResult};
use super::get_runner::{log_strategy, Dispatcher};

impl<'a, P, B, S> Dispatcher<'a, P, B, S>
where
    P: PlanProvider,
    B: StageBuilder,
    S: ShardingCatalog,
{
    /// Dispatches a distinct over `field`.
    pub fn get_runner_distinct(
        &self,
        collection: Option<&Arc<Collection>>,
        ns: &Namespace,
        raw_query: Value,
        field: &str,
    ) -> DispatchResult<Box<dyn Runner>> {
        if field.split('.').any(|part| part.starts_with('$')) {
            return Err(DispatchError::bad_value(format!(
                "positional operator not allowed in distinct field: {}",
                field
            )));
        }

        // An implicit covering projection steers the planner toward
        // covered plans
        let options = ParsedOptions {
            projection: Some(distinct_projection(field)),
            ..ParsedOptions::default()
        };
        let query = CanonicalQuery::canonicalize(ns.clone(), raw_query, options)?;

        let Some(collection) = collection else {
            return self.get_runner(None, query, PlannerOptions::DEFAULT);
        };

        // Only indexes prefixed by the distinct field are interesting,
        // and a collection scan never is
        let mut params = QueryPlannerParams {
            options: PlannerOptions::NO_TABLE_SCAN,
            ..QueryPlannerParams::default()
        };
        for descriptor in collection.ready_indexes() {
            if descriptor.key_pattern.first_field() == Some(field) {
                params.indices.push(IndexEntry {
                    key_pattern: descriptor.key_pattern.clone(),
                    multikey: descriptor.multikey,
                    sparse: descriptor.sparse,
                    name: descriptor.name.clone(),
                    plugin: descriptor.plugin,
                });
            }
        }

        // Mode A: no predicate, scan a whole index skipping to each
        // next distinct key; no planning needed
        if query.root().is_empty() {
            if let Some(entry) = pick_distinct_index(&params.indices) {
                let node = QuerySolutionNode::Distinct(DistinctNode {
                    index_key_pattern: entry.key_pattern.clone(),
                    direction: 1,
                    bounds: IndexBounds::all_values_over(&entry.key_pattern),
                    field_no: 0,
                });
                if let Some(solution) = self.planner.analyze(&query, &params, node) {
                    let (root, ws) = self.build_tree(&query, &solution)?;
                    log_strategy(query.ns(), "DISTINCT");
                    return Ok(Box::new(SingleSolutionRunner::new(
                        Some(collection.clone()),
                        query,
                        solution,
                        root,
                        ws,
                    )));
                }
            }
            return self.get_runner(Some(collection), query, PlannerOptions::DEFAULT);
        }

        // Mode B: plan over the restricted index list and take the
        // first solution the rewrite accepts
        if params.indices.is_empty() {
            return self.get_runner(Some(collection), query, PlannerOptions::DEFAULT);
        }
        match self.planner.plan(&query, &params) {
            Ok(mut solutions) => {
                for i in 0..solutions.len() {
                    if turn_ixscan_into_distinct(&mut solutions[i], field) {
                        let solution = solutions.swap_remove(i);
                        let (root, ws) = self.build_tree(&query, &solution)?;
                        log_strategy(query.ns(), "DISTINCT");
                        return Ok(Box::new(SingleSolutionRunner::new(
                            Some(collection.clone()),
                            query,
                            solution,
                            root,
                            ws,
                        )));
                    }
                }
                self.get_runner(Some(collection), query, PlannerOptions::DEFAULT)
            }
            Err(_) => self.get_runner(Some(collection), query, PlannerOptions::DEFAULT),
        }
    }
}

/// The implicit distinct projection: `{_id: 0, <field>: 1}`, or
/// `{_id: 1}` when the distinct field is `_id` itself
fn distinct_projection(field: &str) -> Value {
    if field == "_id" {
        return json!({"_id": 1});
    }
    let mut projection = Map::new();
    projection.insert("_id".to_string(), json!(0));
    projection.insert(field.to_string(), json!(1));
    Value::Object(projection)
}

/// Usable-index selection for mode A: the fewest-field index whose
/// plugin is plain. Special access methods cannot distinct-scan.
fn pick_distinct_index(indices: &[IndexEntry]) -> Option<&IndexEntry> {
    indices
        .iter()
        .filter(|e| !e.plugin.is_special())
        .min_by_key(|e| e.key_pattern.len())
}
