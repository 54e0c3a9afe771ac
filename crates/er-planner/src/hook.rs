//! The reentrant store-search override.
//!
//! Hosts route their generic "where should this item be stored?" search
//! through [`StoreSearchHook::on_store_search`] before running their own.
//! The answer depends on the call-context stack and on the agent's detour.
//! Rules are tried top to bottom:
//!
//! | Stack                                        | Detour       | Behaviour                                   |
//! |----------------------------------------------|--------------|---------------------------------------------|
//! | empty                                        | any          | `Continue`                                  |
//! | holds `OpportunityPlan` or `BeforeCarryPlan` | any          | `Continue`                                  |
//! | top `BatchAllocate`, no `BatchScan`          | any          | `Continue`                                  |
//! | any                                          | inactive     | `Continue`                                  |
//! | top `BatchUnload`                            | any active   | recorded type cell if still good            |
//! | top `BatchScan`                              | opportunity  | search biased toward the job                |
//! | top `BatchAllocate` under `BatchScan`        | opportunity  | as scan, then extend the chain or reject    |
//! | any                                          | before-carry | search toward the carry target, record type |
//! | any                                          | bare batch   | plain search, record type                   |
//!
//! Resolutions are cached in the [`SearchScope`] until the outermost phase
//! pops.  Searches skip cells already handed out in the scope and cells
//! promised to the detour's other hauls; a rejected allocation evicts the
//! item and hands its cell back.

use er_core::{AgentId, Cell, ItemId, ItemView};
use er_detour::{DetourKind, DetourTable, Haul, TrackOutcome, TripBudget};
use er_spatial::{PathCostOracle, Reachability};
use er_storage::{CellQuery, SearchStyle, StoragePriority, StorageView};

use crate::{CallPhase, HaulHost, Planner, SearchScope};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HookOutcome {
    /// Run the host's own search.
    Continue,
    /// Use this answer; `None` means "no store cell".
    Resolved(Option<Cell>),
}

pub trait StoreSearchHook<H: HaulHost> {
    fn on_store_search(
        &mut self,
        host:  &H,
        agent: AgentId,
        item:  &ItemView,
        floor: StoragePriority,
    ) -> HookOutcome;
}

impl<P, Q, H> StoreSearchHook<H> for Planner<P, Q>
where
    P: PathCostOracle,
    Q: Reachability,
    H: HaulHost,
{
    fn on_store_search(
        &mut self,
        host:     &H,
        agent_id: AgentId,
        item:     &ItemView,
        floor:    StoragePriority,
    ) -> HookOutcome {
        let Some(top) = self.scope.top() else {
            tracing::trace!(agent = %agent_id, item = %item.id, "store search outside any phase");
            return HookOutcome::Continue;
        };
        if self.scope.in_plan() {
            tracing::trace!(agent = %agent_id, item = %item.id, "store search inside a plan call");
            return HookOutcome::Continue;
        }
        if top == CallPhase::BatchAllocate && !self.scope.contains(CallPhase::BatchScan) {
            tracing::trace!(agent = %agent_id, item = %item.id, "allocation outside a batch scan");
            return HookOutcome::Continue;
        }
        let Some(kind) = self.detours.active(agent_id).map(|d| d.kind) else {
            return HookOutcome::Continue;
        };
        let Some(agent) = host.agent(agent_id) else {
            return HookOutcome::Continue;
        };
        let storage = host.storage();
        let cached = self.scope.cache().get(item.id);

        match top {
            CallPhase::BatchUnload => {
                if let Some(resolved) = cached {
                    return HookOutcome::Resolved(resolved);
                }
                let cell = self
                    .detours
                    .get(agent_id)
                    .and_then(|d| d.type_cell(item.kind))
                    .filter(|&c| storage.is_good_store_cell(c, agent_id, item));
                match cell {
                    Some(cell) => {
                        self.scope.cache_mut().insert(item.id, Some(cell));
                        HookOutcome::Resolved(Some(cell))
                    }
                    None => HookOutcome::Continue,
                }
            }

            CallPhase::BatchScan | CallPhase::BatchAllocate if kind.is_opportunity() => {
                let found = match cached {
                    Some(resolved) => resolved,
                    None => {
                        exclude_allocated(&self.detours, &mut self.scope, agent_id, item.id);
                        let mut query = CellQuery::opportunity(item, agent_id, agent.position).with_floor(floor);
                        if let Some(job) = kind.job_target() {
                            query = query.with_target(job);
                        }
                        self.finder.find_closest_acceptable_cell(storage, &query, Some(self.scope.excluded_mut()))
                    }
                };
                let Some(cell) = found else {
                    self.scope.cache_mut().insert(item.id, None);
                    return HookOutcome::Resolved(None);
                };

                if top == CallPhase::BatchAllocate {
                    let haul = Haul {
                        item:       item.id,
                        kind:       item.kind,
                        item_cell:  item.position().unwrap_or(agent.position),
                        store_cell: cell,
                    };
                    let budget = TripBudget::from_settings(&self.settings);
                    let Some(detour) = self.detours.get_mut(agent_id) else {
                        return HookOutcome::Continue;
                    };
                    match detour.track_if_opportune(haul, agent.carried, &budget) {
                        Ok(TrackOutcome::Accepted { .. }) => {}
                        Ok(TrackOutcome::Rejected { .. }) => {
                            self.scope.cache_mut().evict(item.id);
                            self.scope.release(cell);
                            return HookOutcome::Resolved(None);
                        }
                        Err(e) => {
                            self.limiter.warn(agent_id, "track_if_opportune", host.now(), &e.to_string());
                            self.scope.cache_mut().evict(item.id);
                            self.scope.release(cell);
                            return HookOutcome::Resolved(None);
                        }
                    }
                }
                self.scope.cache_mut().insert(item.id, Some(cell));
                HookOutcome::Resolved(Some(cell))
            }

            _ if kind.is_before_carry() || kind == DetourKind::InventoryBatch => {
                if let Some(resolved) = cached {
                    return HookOutcome::Resolved(resolved);
                }
                exclude_allocated(&self.detours, &mut self.scope, agent_id, item.id);
                let mut query = CellQuery::opportunity(item, agent_id, agent.position).with_floor(floor);
                if let Some(carry) = kind.carry_target() {
                    query = query.with_target(carry).with_style(SearchStyle::BeforeCarry);
                }
                let found = self.finder.find_closest_acceptable_cell(storage, &query, Some(self.scope.excluded_mut()));
                if let (Some(cell), Some(detour)) = (found, self.detours.get_mut(agent_id)) {
                    detour.record_type_cell(item.kind, cell);
                }
                self.scope.cache_mut().insert(item.id, found);
                HookOutcome::Resolved(found)
            }

            _ => HookOutcome::Continue,
        }
    }
}

/// Cells promised to the agent's other hauls are not handed out again.
fn exclude_allocated(detours: &DetourTable, scope: &mut SearchScope, agent: AgentId, item: ItemId) {
    if let Some(detour) = detours.get(agent) {
        let promised = detour.hauls().iter().filter(|h| h.item != item).map(|h| h.store_cell);
        scope.excluded_mut().extend(promised);
    }
}
