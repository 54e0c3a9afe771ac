//! The `Sim` struct and its tick loop.

use er_core::{AgentId, Tick};
use er_planner::{HaulAction, Planner};
use er_spatial::{DijkstraPathCost, PathCostOracle, Reachability, RegionBfs};

use crate::{BatchExtension, SimObserver, SimResult, Task, TaskKind, TaskScheduler, World};

/// The main simulation runner.
///
/// Each tick visits agents in ascending `AgentId` order:
///
/// 1. **Start**: an idle agent promotes its next queued task.  Starting a
///    `Construct` asks the planner for an opportunistic haul toward the
///    site; starting a `Carry` asks for a before-carry haul.  A returned
///    action is reserved and pushed in front of the task.
/// 2. **Advance**: the active task moves the agent one cell, picks up,
///    drops off, or works.
/// 3. **Finish**: a completed task is reported to the observer, and a
///    finished planner haul ends the agent's detour.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<P = DijkstraPathCost, Q = RegionBfs> {
    pub world:     World,
    pub planner:   Planner<P, Q>,
    pub scheduler: TaskScheduler,
    /// Present when the inventory-batch extension is installed.
    pub batch:     Option<BatchExtension>,
    /// `run` stops before this tick.
    pub end_tick:  Tick,
}

impl<P: PathCostOracle, Q: Reachability> Sim<P, Q> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `end_tick`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.world.now() < self.end_tick {
            self.step(observer)?;
        }
        observer.on_sim_end(self.world.now());
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    pub fn assign(&mut self, agent: AgentId, task: Task) {
        self.scheduler.enqueue(agent, task);
    }

    /// The agent's active task, described the way a player would see it.
    pub fn report(&self, agent: AgentId) -> Option<String> {
        let task = self.scheduler.active(agent)?;
        Some(self.planner.decorate_report(agent, &task.describe()))
    }

    /// Drop every task the agent has and put down what it holds.
    pub fn interrupt(&mut self, agent: AgentId) -> SimResult<Vec<Task>> {
        let dropped = self.scheduler.interrupt_queue(agent);
        self.world.spill(agent)?;
        self.world.release_all(agent);
        self.planner.on_queue_interrupted(agent, self.world.now());
        Ok(dropped)
    }

    pub fn remove_agent(&mut self, agent: AgentId) -> SimResult<()> {
        self.scheduler.interrupt_queue(agent);
        self.world.remove_agent(agent)?;
        self.planner.on_agent_removed(agent);
        tracing::debug!(%agent, "agent removed");
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.world.now();
        observer.on_tick_start(now);
        self.process_tick(now, observer)?;
        self.world.clock.advance();
        Ok(())
    }

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<()> {
        self.world.reindex();

        for i in 0..self.world.agent_count() {
            let agent = AgentId::from_index(i);
            if !self.world.agent_state(agent).is_some_and(|a| a.present) {
                continue;
            }

            // ── Phase 1: start ────────────────────────────────────────────
            if self.scheduler.active(agent).is_none() {
                if self.scheduler.start_task(agent).is_none() {
                    continue;
                }
                self.begin_task(agent, now, observer);
            }

            // ── Phase 2: advance ──────────────────────────────────────────
            let done = self.advance_task(agent)?;

            // ── Phase 3: finish ───────────────────────────────────────────
            if done {
                self.finish_task(agent, now, observer);
            }
        }
        Ok(())
    }

    /// Give the planner a chance to slot a haul in front of a fresh task.
    fn begin_task<O: SimObserver>(&mut self, agent: AgentId, now: Tick, observer: &mut O) {
        let Some(task) = self.scheduler.active(agent).cloned() else {
            return;
        };
        let action = match (task.kind, task.item) {
            (TaskKind::Construct, _) => self.planner.plan_opportunity(&self.world, agent, task.target),
            (TaskKind::Carry, Some(item)) => {
                self.planner.plan_before_carry(&self.world, agent, task.target, item)
            }
            _ => None,
        };
        let Some(action) = action else {
            return;
        };
        if !self.reserve(&action) {
            tracing::warn!(%agent, item = %action.item, "planned haul could not be reserved");
            self.planner.on_task_finished(agent, now);
            return;
        }
        tracing::debug!(%agent, item = %action.item, store_cell = %action.store_cell, reason = %action.reason, "haul queued");
        observer.on_action(now, &action);
        self.scheduler.preempt(agent, Task::from_action(&action));
    }

    fn reserve(&mut self, action: &HaulAction) -> bool {
        if !self.world.reserve_item(action.item, action.agent) {
            return false;
        }
        if self.world.storage_map_mut().reserve(action.store_cell, action.agent).is_err() {
            self.world.release_item(action.item);
            return false;
        }
        true
    }

    /// Move the active task along by one tick.  Returns `true` once done.
    fn advance_task(&mut self, agent: AgentId) -> SimResult<bool> {
        let Some(task) = self.scheduler.active(agent).cloned() else {
            return Ok(false);
        };
        match task.kind {
            TaskKind::Construct => {
                if !self.world.step_toward(agent, task.target)? {
                    return Ok(false);
                }
                let Some(active) = self.scheduler.active_mut(agent) else {
                    return Ok(false);
                };
                active.work_ticks = active.work_ticks.saturating_sub(1);
                Ok(active.work_ticks == 0)
            }
            TaskKind::Haul | TaskKind::Carry => self.advance_delivery(agent, &task),
        }
    }

    /// Fetch the task item, then take it to the task target.
    fn advance_delivery(&mut self, agent: AgentId, task: &Task) -> SimResult<bool> {
        let Some(item) = task.item else {
            return Ok(true);
        };
        let holding = self.world.agent_state(agent).is_some_and(|a| a.carried == Some(item));

        if !holding {
            let Some(at) = self.world.item_view(item).and_then(|i| i.position()) else {
                tracing::warn!(%agent, %item, "task item is no longer on the ground");
                return Ok(true);
            };
            if self.world.step_toward(agent, at)? {
                if let Err(e) = self.world.pick_up(agent, item) {
                    tracing::warn!(%agent, %item, error = %e, "pick up failed");
                    return Ok(true);
                }
                if self.batch_ready(agent) {
                    if let Some(batch) = self.batch {
                        batch.collect(&mut self.planner, &mut self.world, agent)?;
                    }
                }
            }
            return Ok(false);
        }

        if !self.world.step_toward(agent, task.target)? {
            return Ok(false);
        }
        if let Err(e) = self.world.drop_carried(agent, task.target) {
            tracing::warn!(%agent, %item, error = %e, "drop failed, spilling");
            self.world.spill(agent)?;
            return Ok(true);
        }
        if task.kind == TaskKind::Haul {
            if let Some(batch) = self.batch {
                batch.unload(&mut self.planner, &mut self.world, agent)?;
            }
        }
        Ok(true)
    }

    fn batch_ready(&self, agent: AgentId) -> bool {
        self.batch.is_some()
            && self
                .planner
                .detours()
                .active(agent)
                .is_some_and(|d| d.kind.is_inventory_batch())
    }

    fn finish_task<O: SimObserver>(&mut self, agent: AgentId, now: Tick, observer: &mut O) {
        let Some(task) = self
            .scheduler
            .finish_task(agent, |task| observer.on_task_finished(now, agent, task))
        else {
            return;
        };
        if let Some(item) = task.item {
            self.world.release_item(item);
        }
        if task.kind == TaskKind::Haul && self.world.storage_map().reserved_by(task.target) == Some(agent) {
            self.world.storage_map_mut().release(task.target);
        }
        if task.reason.is_some() {
            self.planner.on_task_finished(agent, now);
        }
    }
}
