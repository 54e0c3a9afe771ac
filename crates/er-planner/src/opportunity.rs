//! Opportunistic hauling: store something on the way to the job.
//!
//! # Expanding search
//!
//! The candidate list is read once.  A cursor walks it, evaluating each item
//! against a shared [`MaxRanges`] budget:
//!
//! * hard failures are removed from the list (the cursor stays put);
//! * range failures are skipped (or removed when the path-check mode makes
//!   them fatal);
//! * when the cursor runs off the end with items still pending, the budget
//!   is multiplied by `heuristic_expand_factor` and the cursor restarts.
//!
//! Cheap, nearby candidates are therefore accepted before anything that
//! needs a wide budget is looked at.

use rustc_hash::{FxHashMap, FxHashSet};

use er_core::{AgentId, Cell, DiagnosticLimiter, ItemId, MaxRanges, PlannerSettings};
use er_detour::{DetourKind, DetourTable, Haul, TrackOutcome, TripBudget};

use crate::{
    AgentView, DetourReason, HaulAction, HaulHost, PlanResult, ProximityCheck, ProximityEvaluator,
    StageMemo,
};

/// Counters from the last plan, for diagnostics and tests.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlanStats {
    pub candidates: usize,
    pub evaluated:  usize,
    /// Budget in force when the plan ended.
    pub ranges:     MaxRanges,
}

pub struct OpportunityPlanner<'a, H: HaulHost> {
    pub evaluator:       ProximityEvaluator<'a, H>,
    pub settings:        &'a PlannerSettings,
    /// Use the inventory-batch detour variant on commit.
    pub inventory_batch: bool,
}

impl<'a, H: HaulHost> OpportunityPlanner<'a, H> {
    /// Find one item worth storing on the way from the agent to `job_target`
    /// and commit it to the agent's detour.
    ///
    /// `on_expand` sees the budget after every expansion.
    pub fn plan(
        &self,
        agent_id:   AgentId,
        job_target: Cell,
        detours:    &mut DetourTable,
        limiter:    &mut DiagnosticLimiter,
        mut on_expand: impl FnMut(&MaxRanges),
    ) -> (Option<HaulAction>, Option<PlanStats>) {
        let s = self.settings;
        if !s.enabled {
            return (None, None);
        }
        let host = self.evaluator.host;
        let now = host.now();
        let Some(agent) = host.agent(agent_id) else {
            return (None, None);
        };
        if detours.get(agent_id).is_some_and(|d| d.in_debounce(now, s.opportunity_debounce_ticks)) {
            tracing::trace!(agent = %agent_id, "opportunity debounced");
            return (None, None);
        }
        if agent.position.distance(job_target) < s.min_orig_trip {
            return (None, None);
        }

        let mut candidates = host.candidate_haulables(agent_id);
        let mut stats = PlanStats {
            candidates: candidates.len(),
            evaluated:  0,
            ranges:     MaxRanges::from_settings(s),
        };
        let mut memos: FxHashMap<ItemId, StageMemo> = FxHashMap::default();
        let mut excluded: FxHashSet<Cell> = FxHashSet::default();
        let mut cursor = 0;
        let fatal_range = s.path_check.range_fail_is_fatal();

        while !candidates.is_empty() {
            if cursor >= candidates.len() {
                if stats.ranges.expand_count >= s.max_expansions {
                    limiter.warn(agent_id, "max_expansions", now, "opportunity search hit the expansion cap");
                    break;
                }
                stats.ranges.expand(s.heuristic_expand_factor);
                on_expand(&stats.ranges);
                tracing::trace!(agent = %agent_id, expansions = stats.ranges.expand_count, "range budget expanded");
                cursor = 0;
                continue;
            }

            let item = candidates[cursor];
            let prior = memos.get(&item.id).copied().unwrap_or_default();
            let (check, memo) = self.evaluator.evaluate(&agent, &item, job_target, &stats.ranges, prior, &mut excluded);
            memos.insert(item.id, memo);
            stats.evaluated += 1;

            match check {
                ProximityCheck::HardFail => {
                    candidates.remove(cursor);
                }
                ProximityCheck::RangeFail if fatal_range => {
                    if let Some(cell) = memo.store_cell {
                        excluded.remove(&cell);
                    }
                    candidates.remove(cursor);
                }
                ProximityCheck::RangeFail => cursor += 1,
                ProximityCheck::Success(store_cell) => {
                    let Some(item_cell) = item.position() else {
                        candidates.remove(cursor);
                        continue;
                    };
                    let haul = Haul { item: item.id, kind: item.kind, item_cell, store_cell };
                    match self.commit(&agent, job_target, haul, detours) {
                        Ok(true) => {
                            tracing::debug!(
                                agent = %agent_id,
                                item = %item.id,
                                %store_cell,
                                expansions = stats.ranges.expand_count,
                                "opportunity committed"
                            );
                            let action = HaulAction {
                                agent:      agent_id,
                                item:       item.id,
                                from:       item_cell,
                                store_cell,
                                reason:     DetourReason::Opportunity,
                            };
                            return (Some(action), Some(stats));
                        }
                        Ok(false) => {}
                        Err(e) => limiter.warn(agent_id, "opportunity_commit", now, &e.to_string()),
                    }
                    excluded.remove(&store_cell);
                    candidates.remove(cursor);
                }
            }
        }
        (None, Some(stats))
    }

    /// Open or extend the agent's opportunity detour with `haul`.
    ///
    /// Returns `Ok(false)` if the chain budget rejects it; the detour is then
    /// exactly as it was before the call.
    fn commit(
        &self,
        agent:      &AgentView,
        job_target: Cell,
        haul:       Haul,
        detours:    &mut DetourTable,
    ) -> PlanResult<bool> {
        let budget = TripBudget::from_settings(self.settings);
        let detour = detours.get_or_insert(agent.id);
        let extending = detour.kind.job_target() == Some(job_target);

        let before = (!extending).then(|| detour.clone());
        if !extending {
            let mut kind = DetourKind::Opportunity { job_target };
            if self.inventory_batch {
                kind = kind.with_inventory_batch();
            }
            detour.activate(kind, agent.position);
        }

        match detour.track_if_opportune(haul, agent.carried, &budget) {
            Ok(TrackOutcome::Accepted { .. }) => Ok(true),
            outcome => {
                if let Some(before) = before {
                    *detour = before;
                }
                outcome.map(|_| false).map_err(Into::into)
            }
        }
    }
}
