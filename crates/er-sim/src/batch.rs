//! The inventory-batch hauling extension.
//!
//! When an agent on a batch-capable detour picks up its haul item, the
//! extension sweeps nearby loose items into the agent's inventory, and
//! unloads them when the haul is dropped off.  It never picks storage cells
//! itself: every choice goes through [`Planner::resolve_store_cell`] from
//! inside a [`CallPhase`], so the planner's store-search hook decides.
//!
//! ```text
//! collect:  BatchScan ─┬─ resolve(item)            (cached per item)
//!                      └─ BatchAllocate ── resolve(item)  (extends the chain)
//! unload:   BatchUnload ── resolve(item)           (prefers the type cell)
//! ```
//!
//! Movement between unload cells is not simulated; items are set down on
//! their resolved cells directly.

use er_core::{AgentId, Cell, ItemId, ItemView};
use er_planner::{CallPhase, HaulHost, Planner};
use er_spatial::{PathCostOracle, Reachability};
use er_storage::{StoragePriority, StorageView};

use crate::{SimResult, World};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BatchExtension {
    /// Loose items within this straight-line distance of the agent are
    /// considered for the batch.
    pub pickup_radius: f32,
}

impl Default for BatchExtension {
    fn default() -> Self {
        Self { pickup_radius: 3.0 }
    }
}

impl BatchExtension {
    pub fn new(pickup_radius: f32) -> Self {
        Self { pickup_radius }
    }

    /// Choose nearby items to add to the batch and where each will go.
    ///
    /// Items are visited nearest-first.  Each one is resolved once under
    /// `BatchScan` and then allocated under a nested `BatchAllocate`; only
    /// items the allocation accepts are returned.
    pub fn scan<P, Q>(&self, planner: &mut Planner<P, Q>, world: &World, agent: AgentId) -> Vec<(ItemId, Cell)>
    where
        P: PathCostOracle,
        Q: Reachability,
    {
        let Some(view) = world.agent(agent) else {
            return Vec::new();
        };
        let radius_sq = self.pickup_radius * self.pickup_radius;
        let nearby: Vec<ItemView> = world
            .candidate_haulables(agent)
            .into_iter()
            .take_while(|i| i.position().is_some_and(|at| at.distance_sq(view.position) as f32 <= radius_sq))
            .filter(|i| world.can_reserve(agent, i.id) && !world.is_forbidden(agent, i.id))
            .collect();
        if nearby.is_empty() {
            return Vec::new();
        }

        let mut room = view.capacity - view.carried_mass;
        planner.enter_phase(CallPhase::BatchScan, |p| {
            let mut picked = Vec::new();
            for item in &nearby {
                if item.total_mass() > room {
                    continue;
                }
                let floor = world.storage().current_priority_of(item);
                if p.resolve_store_cell(world, agent, item, floor).is_none() {
                    continue;
                }
                let allocated = p.enter_phase(CallPhase::BatchAllocate, |p| {
                    p.resolve_store_cell(world, agent, item, floor)
                });
                if let Some(cell) = allocated {
                    room -= item.total_mass();
                    picked.push((item.id, cell));
                }
            }
            picked
        })
    }

    /// [`scan`](Self::scan), then stow every accepted item.
    pub fn collect<P, Q>(&self, planner: &mut Planner<P, Q>, world: &mut World, agent: AgentId) -> SimResult<Vec<ItemId>>
    where
        P: PathCostOracle,
        Q: Reachability,
    {
        let picks = self.scan(planner, world, agent);
        let mut stowed = Vec::with_capacity(picks.len());
        for (item, cell) in picks {
            world.stow(agent, item)?;
            tracing::debug!(%agent, %item, store_cell = %cell, "stowed for batch");
            stowed.push(item);
        }
        Ok(stowed)
    }

    /// Set down everything in the agent's inventory.
    ///
    /// Items are taken in the detour's unload order (type cells nearest the
    /// agent first).  An item with no resolved cell, or whose cell has
    /// filled up, stays in the inventory.
    pub fn unload<P, Q>(&self, planner: &mut Planner<P, Q>, world: &mut World, agent: AgentId) -> SimResult<Vec<(ItemId, Cell)>>
    where
        P: PathCostOracle,
        Q: Reachability,
    {
        let mut inventory = world.inventory_of(agent);
        let Some(at) = world.agent(agent).map(|a| a.position) else {
            return Ok(Vec::new());
        };
        if inventory.is_empty() {
            return Ok(Vec::new());
        }

        let host: &World = world;
        let plan: Vec<(ItemView, Option<Cell>)> = planner.enter_phase(CallPhase::BatchUnload, |p| {
            let mut plan = Vec::with_capacity(inventory.len());
            while !inventory.is_empty() {
                let next = p
                    .detour(agent)
                    .and_then(|d| d.next_unload(&inventory, at))
                    .and_then(|id| inventory.iter().position(|i| i.id == id))
                    .unwrap_or(0);
                let item = inventory.remove(next);
                let cell = p.resolve_store_cell(host, agent, &item, StoragePriority::Unstored);
                plan.push((item, cell));
            }
            plan
        });

        let mut unloaded = Vec::with_capacity(plan.len());
        for (item, cell) in plan {
            match cell {
                Some(cell) if world.storage_map().room_for(cell, item.kind) >= item.stack_count => {
                    world.unload(agent, item.id, cell)?;
                    unloaded.push((item.id, cell));
                }
                _ => tracing::debug!(%agent, item = %item.id, "no room to unload, keeping in inventory"),
            }
        }
        Ok(unloaded)
    }
}
