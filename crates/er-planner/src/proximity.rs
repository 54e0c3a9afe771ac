//! The proximity evaluator: can this agent haul this item on the way?
//!
//! # Stages
//!
//! ```text
//! Initial ─▶ DistanceToItem ─▶ TripTotal ─▶ StoreToTargetRegion ─▶ Success
//!               │    │             │    │            │
//!           RangeFail │        RangeFail │            │
//!                     └─────────────────┴────────────┴──▶ Fail (HardFail)
//! ```
//!
//! * `DistanceToItem`: agent→item range caps (retryable), then reservation,
//!   forbidden and eligibility predicates, then the storage search.
//! * `TripTotal`: store→job range caps (retryable), then the straight-line
//!   total-trip and new-legs ratios.
//! * `StoreToTargetRegion`: the same ratios over path costs when the
//!   path-cost oracle is in use, otherwise bounded region reachability.
//!
//! The stage reached and the store cell found are returned as a
//! [`StageMemo`]; handing it back on the next call resumes after the storage
//! search instead of repeating it.  `Fail` is terminal: a memo in that stage
//! hard-fails again without looking at anything.

use rustc_hash::FxHashSet;

use er_core::{Cell, ItemView, MaxRanges, PlannerSettings};
use er_spatial::{PathCostOracle, Reachability, TraverseMode};
use er_storage::{CellQuery, StorageCellFinder, StorageView};

use crate::{AgentView, HaulHost};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ProximityStage {
    #[default]
    Initial,
    DistanceToItem,
    TripTotal,
    StoreToTargetRegion,
    Success,
    Fail,
}

/// Outcome of one evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProximityCheck {
    Success(Cell),
    /// Outside the current range caps; may pass after an expansion.
    RangeFail,
    /// Infeasible for the rest of this plan.
    HardFail,
}

/// Per-item progress carried between evaluations within one plan.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct StageMemo {
    pub stage:      ProximityStage,
    pub store_cell: Option<Cell>,
}

impl StageMemo {
    #[inline]
    fn failed(self) -> Self {
        Self { stage: ProximityStage::Fail, ..self }
    }
}

/// `d_sq ≤ min(abs, pct)²`.
#[inline]
fn within(d_sq: i64, abs: f32, pct: f32) -> bool {
    let cap = abs.min(pct).max(0.0);
    (d_sq as f32) <= cap * cap
}

pub struct ProximityEvaluator<'a, H: HaulHost> {
    pub host:     &'a H,
    pub settings: &'a PlannerSettings,
    pub finder:   &'a StorageCellFinder,
    pub path:     Option<&'a dyn PathCostOracle>,
    pub reach:    &'a dyn Reachability,
}

impl<'a, H: HaulHost> ProximityEvaluator<'a, H> {
    /// Evaluate `item` for a detour on the way to `job_target`.
    ///
    /// A store cell found here is added to `excluded` and stays there while
    /// the item is pending; a hard failure after the search gives it back.
    pub fn evaluate(
        &self,
        agent:      &AgentView,
        item:       &ItemView,
        job_target: Cell,
        ranges:     &MaxRanges,
        prior:      StageMemo,
        excluded:   &mut FxHashSet<Cell>,
    ) -> (ProximityCheck, StageMemo) {
        let mut memo = prior;
        if memo.stage == ProximityStage::Fail {
            return (ProximityCheck::HardFail, memo);
        }
        let Some(item_cell) = item.position() else {
            return (ProximityCheck::HardFail, memo.failed());
        };
        let orig_trip = agent.position.distance(job_target);

        let store_cell = match memo.store_cell {
            Some(cell)
                if matches!(
                    memo.stage,
                    ProximityStage::TripTotal | ProximityStage::StoreToTargetRegion | ProximityStage::Success
                ) =>
            {
                cell
            }
            _ => {
                memo.stage = ProximityStage::DistanceToItem;
                let d_sq = agent.position.distance_sq(item_cell);
                if !within(d_sq, ranges.start_to_item, ranges.start_to_item_pct_orig_trip * orig_trip) {
                    return (ProximityCheck::RangeFail, memo);
                }
                if !self.host.can_reserve(agent.id, item.id)
                    || self.host.is_forbidden(agent.id, item.id)
                    || !self.host.is_haul_eligible(agent.id, item)
                {
                    return (ProximityCheck::HardFail, memo.failed());
                }

                let storage = self.host.storage();
                let query = CellQuery::opportunity(item, agent.id, agent.position)
                    .with_target(job_target)
                    .with_floor(storage.current_priority_of(item));
                let Some(cell) = self.finder.find_closest_acceptable_cell(storage, &query, Some(&mut *excluded)) else {
                    return (ProximityCheck::HardFail, memo.failed());
                };
                memo.store_cell = Some(cell);
                memo.stage = ProximityStage::TripTotal;
                cell
            }
        };

        let check = self.check_trip(agent, item_cell, store_cell, job_target, ranges, orig_trip, &mut memo);
        if check == ProximityCheck::HardFail {
            excluded.remove(&store_cell);
            memo = memo.failed();
        }
        (check, memo)
    }

    #[allow(clippy::too_many_arguments)]
    fn check_trip(
        &self,
        agent:      &AgentView,
        item_cell:  Cell,
        store_cell: Cell,
        job_target: Cell,
        ranges:     &MaxRanges,
        orig_trip:  f32,
        memo:       &mut StageMemo,
    ) -> ProximityCheck {
        // ── TripTotal ─────────────────────────────────────────────────────
        let d_sq = store_cell.distance_sq(job_target);
        if !within(d_sq, ranges.store_to_job, ranges.store_to_job_pct_orig_trip * orig_trip) {
            return ProximityCheck::RangeFail;
        }
        let to_item  = agent.position.distance(item_cell);
        let to_store = item_cell.distance(store_cell);
        let to_job   = store_cell.distance(job_target);
        if !self.ratios_hold(to_item, to_store, to_job, orig_trip) {
            return ProximityCheck::HardFail;
        }
        memo.stage = ProximityStage::StoreToTargetRegion;

        // ── StoreToTargetRegion ───────────────────────────────────────────
        let grid = self.host.grid();
        let oracle = self.path.filter(|_| self.settings.path_check.uses_path_cost());
        match oracle {
            Some(oracle) => {
                let cost = |from: Cell, to: Cell| {
                    if from == to {
                        Some(0.0)
                    } else {
                        let c = oracle.path_cost(grid, from, to, TraverseMode::Normal);
                        (c > 0.0).then_some(c)
                    }
                };
                let (Some(to_item), Some(to_store), Some(to_job), Some(orig_cost)) = (
                    cost(agent.position, item_cell),
                    cost(item_cell, store_cell),
                    cost(store_cell, job_target),
                    cost(agent.position, job_target),
                ) else {
                    return ProximityCheck::HardFail;
                };
                if !self.ratios_hold(to_item, to_store, to_job, orig_cost) {
                    return ProximityCheck::HardFail;
                }
            }
            None => {
                let s = self.settings;
                if !self.reach.reachable_within(grid, agent.position, item_cell, s.max_start_to_item_region_look_count)
                    || !self.reach.reachable_within(grid, store_cell, job_target, s.max_store_to_job_region_look_count)
                {
                    return ProximityCheck::HardFail;
                }
            }
        }

        memo.stage = ProximityStage::Success;
        ProximityCheck::Success(store_cell)
    }

    #[inline]
    fn ratios_hold(&self, to_item: f32, to_store: f32, to_job: f32, orig: f32) -> bool {
        let s = self.settings;
        to_item + to_store + to_job <= orig * s.max_total_trip_pct_orig_trip
            && to_item + to_job <= orig * s.max_new_legs_pct_orig_trip
    }
}
