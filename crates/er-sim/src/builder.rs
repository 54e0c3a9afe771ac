//! Fluent builder for constructing a [`Sim`].

use er_core::{AgentId, PlannerSettings, Tick};
use er_planner::Planner;
use er_spatial::{DijkstraPathCost, PathCostOracle, Reachability, RegionBfs};

use crate::{BatchExtension, Sim, SimError, SimResult, Task, TaskScheduler, World};

/// Ticks run by [`Sim::run`] when no end tick is given.
pub const DEFAULT_RUN_TICKS: u64 = 1_000;

/// Fluent builder for [`Sim<P, Q>`].
///
/// # Required inputs
///
/// - [`World`]: storage, grid, agents and items
/// - [`PlannerSettings`]: the detour budget and switches
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                                 |
/// |--------------------------|-----------------------------------------|
/// | `.oracles(path, reach)`  | `Some(DijkstraPathCost)`, `RegionBfs`   |
/// | `.inventory_batch(ext)`  | no batch extension                      |
/// | `.end_tick(t)`           | now + [`DEFAULT_RUN_TICKS`]             |
/// | `.task(agent, task)`     | empty queues                            |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(world, PlannerSettings::default())
///     .inventory_batch(BatchExtension::default())
///     .task(AgentId(0), Task::construct(Cell::new(20, 0), 5))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<P = DijkstraPathCost, Q = RegionBfs> {
    world:    World,
    settings: PlannerSettings,
    path:     Option<P>,
    reach:    Q,
    batch:    Option<BatchExtension>,
    end_tick: Option<Tick>,
    tasks:    Vec<(AgentId, Task)>,
}

impl SimBuilder {
    /// Create a builder with the bundled oracles.
    pub fn new(world: World, settings: PlannerSettings) -> Self {
        Self {
            world,
            settings,
            path:     Some(DijkstraPathCost),
            reach:    RegionBfs::default(),
            batch:    None,
            end_tick: None,
            tasks:    Vec::new(),
        }
    }
}

impl<P: PathCostOracle, Q: Reachability> SimBuilder<P, Q> {
    /// Swap in other path-cost and reachability oracles.
    pub fn oracles<P2, Q2>(self, path: Option<P2>, reach: Q2) -> SimBuilder<P2, Q2> {
        SimBuilder {
            world:    self.world,
            settings: self.settings,
            path,
            reach,
            batch:    self.batch,
            end_tick: self.end_tick,
            tasks:    self.tasks,
        }
    }

    /// Install the inventory-batch extension.
    pub fn inventory_batch(mut self, ext: BatchExtension) -> Self {
        self.batch = Some(ext);
        self
    }

    pub fn end_tick(mut self, tick: Tick) -> Self {
        self.end_tick = Some(tick);
        self
    }

    /// Queue `task` for `agent` before the first tick.
    pub fn task(mut self, agent: AgentId, task: Task) -> Self {
        self.tasks.push((agent, task));
        self
    }

    /// Validate inputs, build the planner, and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<P, Q>> {
        let now = self.world.now();
        let end_tick = self.end_tick.unwrap_or(now + DEFAULT_RUN_TICKS);
        if end_tick <= now {
            return Err(SimError::Config(format!("end tick {end_tick} is not after {now}")));
        }
        if let Some(ext) = &self.batch {
            if !(ext.pickup_radius >= 0.0) {
                return Err(SimError::Config(format!(
                    "batch pickup radius must not be negative, got {}",
                    ext.pickup_radius
                )));
            }
        }

        let mut scheduler = TaskScheduler::new();
        for (agent, task) in self.tasks {
            if self.world.agent_state(agent).is_none() {
                return Err(SimError::UnknownAgent(agent));
            }
            scheduler.enqueue(agent, task);
        }

        let planner = Planner::with_oracles(self.settings, self.path, self.reach)?
            .with_inventory_batch(self.batch.is_some());

        Ok(Sim {
            world: self.world,
            planner,
            scheduler,
            batch: self.batch,
            end_tick,
        })
    }
}
