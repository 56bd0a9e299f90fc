//! The dispatch core
//!
//! `get_runner` walks a fixed decision ladder, first match wins:
//!
//! 1. no collection → EOF runner
//! 2. simple id query with an `_id` index → id-hack runner
//! 3. build planner params
//! 4. tailable validation
//! 5. plan-cache lookup → cached-plan runner (failures swallowed)
//! 6. enable index-intersection and keep-mutations
//! 7. plan
//! 8. count rewrite pass (count dispatches only)
//! 9. one solution → single-solution runner
//! 10. batch-size + sort → first non-blocking solution
//! 11. many solutions → multi-plan runner
//!
//! On success the canonical query is owned by the returned runner; on
//! any failure it is dropped along with every candidate solution before
//! returning. The runner is not registered here; registration is the
//! scoped concern of `runner::RegistrationGuard`.

use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{Collection, ShardingCatalog};
use crate::exec::{PlanStage, StageBuilder, WorkingSet};
use crate::observability::Logger;
use crate::planner::{CachedPlans, PlanProvider, PlannerOptions};
use crate::query::{is_simple_id_query, CanonicalQuery, Namespace, ParsedOptions};
use crate::rewrite::turn_ixscan_into_count;
use crate::runner::{
    CachedPlanRunner, EofRunner, IdHackRunner, MultiPlanRunner, Runner, SingleSolutionRunner,
};
use crate::solution::QuerySolution;

use super::config::DispatchConfig;
use super::errors::{DispatchError, DispatchResult};
use super::params::fill_out_planner_params;

/// Chooses an execution strategy for canonical queries.
///
/// The planner, stage builder, and sharding state are injected so the
/// dispatcher stays deterministic under test.
pub struct Dispatcher<'a, P, B, S>
where
    P: PlanProvider,
    B: StageBuilder,
    S: ShardingCatalog,
{
    pub(crate) planner: &'a P,
    pub(crate) stage_builder: &'a B,
    pub(crate) sharding: &'a S,
    pub(crate) config: DispatchConfig,
}

impl<'a, P, B, S> Dispatcher<'a, P, B, S>
where
    P: PlanProvider,
    B: StageBuilder,
    S: ShardingCatalog,
{
    /// Creates a dispatcher over the given collaborators
    pub fn new(planner: &'a P, stage_builder: &'a B, sharding: &'a S, config: DispatchConfig) -> Self {
        Self {
            planner,
            stage_builder,
            sharding,
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Raw-query entry: short-circuits a simple id equality to the
    /// id-hack runner without canonicalizing; otherwise canonicalizes
    /// and delegates to `get_runner`.
    pub fn get_runner_raw(
        &self,
        collection: Option<&Arc<Collection>>,
        ns: &Namespace,
        raw_query: Value,
        options: PlannerOptions,
    ) -> DispatchResult<Box<dyn Runner>> {
        if let Some(collection) = collection {
            if is_simple_id_query(&raw_query) && collection.id_index().is_some() {
                if let Some(key) = raw_query.get("_id").cloned() {
                    log_strategy(ns, "IDHACK");
                    return Ok(Box::new(IdHackRunner::from_key(collection.clone(), key)));
                }
            }
        }
        let query = CanonicalQuery::canonicalize(ns.clone(), raw_query, ParsedOptions::default())?;
        self.get_runner(collection, query, options)
    }

    /// General entry: picks a runner for a canonical query.
    ///
    /// Ownership of `query` transfers into the returned runner.
    pub fn get_runner(
        &self,
        collection: Option<&Arc<Collection>>,
        query: CanonicalQuery,
        options: PlannerOptions,
    ) -> DispatchResult<Box<dyn Runner>> {
        // Internal clients query collections that may not exist
        let Some(collection) = collection else {
            log_strategy(query.ns(), "EOF");
            return Ok(Box::new(EofRunner::new(query)));
        };

        // Id hack: a simple id equality with an _id index needs no plan
        if can_use_id_hack(&query) && collection.id_index().is_some() {
            if let Some(key) = query.simple_id_value().cloned() {
                log_strategy(query.ns(), "IDHACK");
                return Ok(Box::new(IdHackRunner::new(collection.clone(), key, query)));
            }
        }

        let mut params =
            fill_out_planner_params(collection, &query, options, &self.config, self.sharding);

        // Tailable requires a capped collection, and the only sort a
        // tailable cursor accepts is {$natural: 1}
        if query.options().tailable {
            if !collection.is_capped() {
                return Err(DispatchError::bad_value(format!(
                    "tailable cursor requested on non capped collection {}",
                    query.ns()
                )));
            }
            if let Some(sort) = &query.options().sort {
                if !sort.is_natural_forward() {
                    return Err(DispatchError::bad_value(format!(
                        "invalid sort specified for tailable cursor: {}",
                        sort
                    )));
                }
            }
        }

        // Plan-cache lookup. A cache failure is a miss, never an error.
        let cache = collection.info().plan_cache();
        if cache.should_cache(&query) {
            if let Some(cached) = cache.get(&query) {
                match self.planner.plan_from_cache(&query, &params, &cached) {
                    Ok(plans) => {
                        return self.runner_from_cached(collection, query, plans, options);
                    }
                    Err(_) => {
                        // Rebuild failed; the cached artifacts are
                        // gone, plan from scratch below.
                    }
                }
            }
        }

        if self.config.enable_index_intersection {
            params.options.set(PlannerOptions::INDEX_INTERSECTION);
        }
        params.options.set(PlannerOptions::KEEP_MUTATIONS);

        let mut solutions = self
            .planner
            .plan(&query, &params)
            .map_err(|e| DispatchError::bad_value(format!("planner returned error: {}", e)))?;

        if solutions.is_empty() {
            return Err(DispatchError::bad_value("No query solutions"));
        }

        // Count dispatches: the first solution that rewrites wins and
        // the rest are freed
        if params.options.contains(PlannerOptions::PRIVATE_IS_COUNT) {
            for i in 0..solutions.len() {
                if turn_ixscan_into_count(&mut solutions[i]) {
                    let solution = solutions.swap_remove(i);
                    log_strategy(query.ns(), "COUNT");
                    return self.single_solution_runner(collection, query, solution);
                }
            }
        }

        if solutions.len() == 1 {
            let solution = solutions.swap_remove(0);
            log_strategy(query.ns(), "SINGLE_SOLUTION");
            return self.single_solution_runner(collection, query, solution);
        }

        // Workaround for cost-based selection going wrong when a batch
        // size combines with a sort: take the first non-blocking plan
        // outright instead of racing. Preserved bit-for-bit.
        if query.options().num_to_return > 0 && query.options().has_sort() {
            if let Some(i) = solutions.iter().position(|s| !s.has_sort_stage) {
                let solution = solutions.swap_remove(i);
                log_strategy(query.ns(), "SINGLE_SOLUTION");
                return self.single_solution_runner(collection, query, solution);
            }
        }

        // Many candidates: the multi-plan runner races them, picks the
        // winner, and updates the cache
        let mut built = Vec::with_capacity(solutions.len());
        for mut solution in solutions {
            if let Some(cache_data) = &mut solution.cache_data {
                cache_data.index_filter_applied = params.index_filters_applied;
            }
            let (root, ws) = self.build_tree(&query, &solution)?;
            built.push((solution, root, ws));
        }
        log_strategy(query.ns(), "MULTI_PLAN");
        let mut runner = MultiPlanRunner::new(collection.clone(), query);
        for (solution, root, ws) in built {
            runner.add_candidate(solution, root, ws);
        }
        Ok(Box::new(runner))
    }

    /// Cache-path materialization (§ ladder step 5)
    fn runner_from_cached(
        &self,
        collection: &Arc<Collection>,
        query: CanonicalQuery,
        plans: CachedPlans,
        options: PlannerOptions,
    ) -> DispatchResult<Box<dyn Runner>> {
        let CachedPlans {
            mut primary,
            mut backup,
        } = plans;

        // Historical-sort override: with a batch size and a sort, a
        // cached blocking-sort plan is not trusted; run the backup
        // directly. Preserved bit-for-bit.
        if query.options().num_to_return > 0 && query.options().has_sort() {
            if let Some(backup_solution) = backup.take() {
                log_strategy(query.ns(), "SINGLE_SOLUTION");
                return self.single_solution_runner(collection, query, backup_solution);
            }
        }

        // Count path: rewrite only the primary; the backup is
        // discarded on success
        if options.contains(PlannerOptions::PRIVATE_IS_COUNT) && turn_ixscan_into_count(&mut primary)
        {
            log_strategy(query.ns(), "COUNT");
            return self.single_solution_runner(collection, query, primary);
        }

        let (primary_root, primary_ws) = self.build_tree(&query, &primary)?;
        let backup_built = match backup {
            Some(solution) => {
                let (root, ws) = self.build_tree(&query, &solution)?;
                Some((solution, root, ws))
            }
            None => None,
        };
        log_strategy(query.ns(), "CACHED_PLAN");
        Ok(Box::new(CachedPlanRunner::new(
            collection.clone(),
            query,
            primary,
            primary_root,
            primary_ws,
            backup_built,
        )))
    }

    /// Wraps one solution in a single-solution runner
    fn single_solution_runner(
        &self,
        collection: &Arc<Collection>,
        query: CanonicalQuery,
        solution: QuerySolution,
    ) -> DispatchResult<Box<dyn Runner>> {
        let (root, ws) = self.build_tree(&query, &solution)?;
        Ok(Box::new(SingleSolutionRunner::new(
            Some(collection.clone()),
            query,
            solution,
            root,
            ws,
        )))
    }

    /// Builds a stage tree and its working set for one solution.
    /// Failure is fatal: the planner must not hand back unbuildable
    /// solutions.
    pub(crate) fn build_tree(
        &self,
        query: &CanonicalQuery,
        solution: &QuerySolution,
    ) -> DispatchResult<(Box<dyn PlanStage>, WorkingSet)> {
        let root = self.stage_builder.build(query, solution)?;
        Ok((root, WorkingSet::new()))
    }
}

/// Id-hack eligibility: simple id equality, and none of explain,
/// showRecordId, or tailable
fn can_use_id_hack(query: &CanonicalQuery) -> bool {
    let options = query.options();
    query.is_simple_id() && !options.explain && !options.show_record_id && !options.tailable
}

pub(crate) fn log_strategy(ns: &Namespace, strategy: &str) {
    Logger::trace("QUERY_DISPATCH", &[("ns", ns.as_str()), ("strategy", strategy)]);
}
