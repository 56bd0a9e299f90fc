//! Planner-params builder
//!
//! Collects everything the planner needs to know about a collection at
//! dispatch time: ready indexes, any query-settings index filter, the
//! table-scan policy, and the shard key when shard filtering was
//! requested.

use crate::catalog::{Collection, ShardingCatalog};
use crate::index::IndexEntry;
use crate::planner::{PlannerOptions, QueryPlannerParams};
use crate::query::CanonicalQuery;

use super::config::DispatchConfig;

/// Assembles planner params for one dispatch.
///
/// The caller's option bits are copied in as-is; policy bits
/// (NO_TABLE_SCAN, INCLUDE_COLLSCAN, INCLUDE_SHARD_FILTER) are then
/// resolved against the config and the sharding state.
pub fn fill_out_planner_params<S: ShardingCatalog>(
    collection: &Collection,
    query: &CanonicalQuery,
    options: PlannerOptions,
    config: &DispatchConfig,
    sharding: &S,
) -> QueryPlannerParams {
    let mut params = QueryPlannerParams {
        options,
        ..QueryPlannerParams::default()
    };

    // Snapshot the ready indexes
    for descriptor in collection.ready_indexes() {
        params.indices.push(IndexEntry {
            key_pattern: descriptor.key_pattern.clone(),
            multikey: descriptor.multikey,
            sparse: descriptor.sparse,
            name: descriptor.name.clone(),
            plugin: descriptor.plugin,
        });
    }

    // An index filter for this query shape overrides both the index
    // list and any hint
    let settings = collection.info().query_settings();
    if let Some(allowed) = settings.get_allowed_indices(&query.shape()) {
        params.indices.retain(|e| allowed.allows(&e.key_pattern));
        params.index_filters_applied = true;
    }

    // Table-scan policy; empty queries, system and local namespaces
    // are exempt
    if config.no_table_scan {
        let ns = query.ns();
        let exempt = query.root().is_empty() || ns.is_system() || ns.is_local();
        if !exempt {
            params.options.set(PlannerOptions::NO_TABLE_SCAN);
        }
    }
    if !params.options.contains(PlannerOptions::NO_TABLE_SCAN) {
        params.options.set(PlannerOptions::INCLUDE_COLLSCAN);
    }

    // Shard filtering only makes sense if the collection is actually
    // sharded; otherwise drop the request
    if params.options.contains(PlannerOptions::INCLUDE_SHARD_FILTER) {
        match sharding.shard_key(query.ns()) {
            Some(key) => params.shard_key = Some(key),
            None => params.options.clear(PlannerOptions::INCLUDE_SHARD_FILTER),
        }
    }

    params
}
