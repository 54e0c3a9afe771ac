//! The `Planner` facade the host talks to.

use er_core::{AgentId, Cell, DiagnosticLimiter, ItemId, ItemView, MaxRanges, PlannerSettings, Tick};
use er_detour::{Detour, DetourTable};
use er_spatial::{DijkstraPathCost, PathCostOracle, Reachability, RegionBfs};
use er_storage::{CellQuery, StorageCellFinder, StoragePriority};

use crate::{
    decorate_report, BeforeCarryPlanner, CallPhase, HaulAction, HaulHost, HookOutcome,
    OpportunityPlanner, PlanResult, PlanStats, ProximityEvaluator, SearchScope, StoreSearchHook,
};

/// Owns all planner state: detours, the call-context stack, diagnostics.
///
/// `P` is the path-cost oracle used in `Pathfinding` mode, `Q` the region
/// reachability oracle used otherwise.
pub struct Planner<P = DijkstraPathCost, Q = RegionBfs> {
    pub(crate) settings:        PlannerSettings,
    pub(crate) finder:          StorageCellFinder,
    pub(crate) detours:         DetourTable,
    pub(crate) scope:           SearchScope,
    pub(crate) limiter:         DiagnosticLimiter,
    /// Whether an inventory-batch extension is present.  Fixed at startup.
    pub(crate) inventory_batch: bool,
    path:                       Option<P>,
    reach:                      Q,
    last_stats:                 Option<PlanStats>,
}

impl Planner {
    /// A planner with the bundled Dijkstra and region oracles.
    pub fn new(settings: PlannerSettings) -> PlanResult<Self> {
        Self::with_oracles(settings, Some(DijkstraPathCost), RegionBfs::default())
    }
}

impl<P: PathCostOracle, Q: Reachability> Planner<P, Q> {
    pub fn with_oracles(settings: PlannerSettings, path: Option<P>, reach: Q) -> PlanResult<Self> {
        settings.validate()?;
        Ok(Self {
            finder:          StorageCellFinder::from_settings(&settings),
            settings,
            detours:         DetourTable::new(),
            scope:           SearchScope::new(),
            limiter:         DiagnosticLimiter::default(),
            inventory_batch: false,
            path,
            reach,
            last_stats:      None,
        })
    }

    /// Declare whether the inventory-batch extension is installed.
    pub fn with_inventory_batch(mut self, present: bool) -> Self {
        self.inventory_batch = present;
        self
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn detours(&self) -> &DetourTable {
        &self.detours
    }

    pub fn detour(&self, agent: AgentId) -> Option<&Detour> {
        self.detours.get(agent)
    }

    pub fn scope(&self) -> &SearchScope {
        &self.scope
    }

    /// Counters from the most recent opportunity plan that got past the
    /// early exits.
    pub fn last_plan_stats(&self) -> Option<&PlanStats> {
        self.last_stats.as_ref()
    }

    #[inline]
    fn batch_variants(&self) -> bool {
        self.inventory_batch && self.settings.inventory_batch
    }

    // ── Planning ──────────────────────────────────────────────────────────

    /// Look for something to store on the way to `job_target`.
    pub fn plan_opportunity<H: HaulHost>(
        &mut self,
        host:       &H,
        agent:      AgentId,
        job_target: Cell,
    ) -> Option<HaulAction> {
        self.plan_opportunity_traced(host, agent, job_target, |_| {})
    }

    /// [`plan_opportunity`](Self::plan_opportunity), reporting every budget
    /// expansion to `on_expand`.
    pub fn plan_opportunity_traced<H: HaulHost>(
        &mut self,
        host:       &H,
        agent:      AgentId,
        job_target: Cell,
        on_expand:  impl FnMut(&MaxRanges),
    ) -> Option<HaulAction> {
        let inventory_batch = self.batch_variants();
        self.scope.push(CallPhase::OpportunityPlan);
        let (action, stats) = {
            let planner = OpportunityPlanner {
                evaluator: ProximityEvaluator {
                    host,
                    settings: &self.settings,
                    finder:   &self.finder,
                    path:     self.path.as_ref().map(|p| p as &dyn PathCostOracle),
                    reach:    &self.reach,
                },
                settings: &self.settings,
                inventory_batch,
            };
            planner.plan(agent, job_target, &mut self.detours, &mut self.limiter, on_expand)
        };
        self.scope.pop();
        if stats.is_some() {
            self.last_stats = stats;
        }
        action
    }

    /// Before carrying `item` to `carry_target`, look for storage nearer the
    /// target to drop it in first.
    pub fn plan_before_carry<H: HaulHost>(
        &mut self,
        host:         &H,
        agent:        AgentId,
        carry_target: Cell,
        item:         ItemId,
    ) -> Option<HaulAction> {
        let inventory_batch = self.batch_variants();
        self.scope.push(CallPhase::BeforeCarryPlan);
        let action = BeforeCarryPlanner {
            host,
            settings: &self.settings,
            finder:   &self.finder,
            inventory_batch,
        }
        .plan(agent, carry_target, item, &mut self.detours);
        self.scope.pop();
        action
    }

    /// Run `f` with `phase` on the call-context stack.
    pub fn enter_phase<R>(&mut self, phase: CallPhase, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scope.push(phase);
        let out = f(self);
        self.scope.pop();
        out
    }

    /// The hook's answer, falling back to an accurate storage search on
    /// `Continue`.  Inside a batch scan the fallback also skips cells the
    /// scope has already handed out.
    pub fn resolve_store_cell<H: HaulHost>(
        &mut self,
        host:  &H,
        agent: AgentId,
        item:  &ItemView,
        floor: StoragePriority,
    ) -> Option<Cell> {
        match self.on_store_search(host, agent, item, floor) {
            HookOutcome::Resolved(cell) => cell,
            HookOutcome::Continue => {
                let pos = host.agent(agent).map_or_else(|| item.position().unwrap_or_default(), |a| a.position);
                let query = CellQuery::opportunity(item, agent, pos).with_floor(floor).accurate();
                let excluded = if self.scope.contains(CallPhase::BatchScan) {
                    Some(self.scope.excluded_mut())
                } else {
                    None
                };
                self.finder.find_closest_acceptable_cell(host.storage(), &query, excluded)
            }
        }
    }

    // ── Host notifications ────────────────────────────────────────────────

    pub fn decorate_report(&self, agent: AgentId, base: &str) -> String {
        decorate_report(self.detours.active(agent), base)
    }

    /// The agent's current task finished.
    pub fn on_task_finished(&mut self, agent: AgentId, now: Tick) {
        if self.detours.deactivate(agent, now) {
            tracing::debug!(%agent, tick = now.0, "detour finished");
        }
    }

    /// The host cleared the agent's task queue.
    pub fn on_queue_interrupted(&mut self, agent: AgentId, now: Tick) {
        if self.detours.deactivate(agent, now) {
            tracing::debug!(%agent, tick = now.0, "detour interrupted");
        }
    }

    /// The agent left the simulation.
    pub fn on_agent_removed(&mut self, agent: AgentId) {
        self.detours.remove(agent);
        self.limiter.forget_agent(agent);
    }
}
