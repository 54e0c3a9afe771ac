//! In-memory world state: agents, items, storage, the passability grid.
//!
//! # Data layout
//!
//! Agents and items are stored in `Vec`s indexed by their ids, so lookups
//! are O(1) and iteration order is deterministic.  Ids are handed out
//! sequentially by [`World::add_agent`] / [`World::add_item`] and never
//! reused.
//!
//! # Haulable index
//!
//! An R-tree (via `rstar`) holds the ground items that sit outside storage.
//! It is a snapshot: [`World::reindex`] rebuilds it, and the sim does so at
//! the start of every tick.  [`HaulHost::candidate_haulables`] walks it
//! nearest-first from the agent and re-validates each entry against live
//! state, so a stale snapshot never yields an item that has since moved.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::{FxHashMap, FxHashSet};

use er_core::{AgentId, Cell, Holding, ItemId, ItemKind, ItemView, SimClock, Tick};
use er_planner::{AgentView, HaulHost};
use er_spatial::PassGrid;
use er_storage::{StorageMap, StoragePriority, StorageView};

use crate::{SimError, SimResult};

// ── R-tree item entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct ItemEntry {
    point: [f32; 2],
    id:    ItemId,
}

impl RTreeObject for ItemEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for ItemEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dz = self.point[1] - point[1];
        dx * dx + dz * dz
    }
}

// ── AgentState ────────────────────────────────────────────────────────────────

/// Mutable per-agent state owned by the world.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    pub id:        AgentId,
    pub position:  Cell,
    /// The single stack in the agent's hands.
    pub carried:   Option<ItemId>,
    /// The carried-inventory container used by the batch extension.
    pub inventory: Vec<ItemId>,
    pub capacity:  f32,
    /// `false` once the agent has been removed from the simulation.
    pub present:   bool,
}

// ── World ─────────────────────────────────────────────────────────────────────

pub struct World {
    storage:      StorageMap,
    grid:         PassGrid,
    agents:       Vec<AgentState>,
    items:        Vec<ItemView>,
    reservations: FxHashMap<ItemId, AgentId>,
    forbidden:    FxHashSet<ItemId>,
    index:        RTree<ItemEntry>,
    /// Advanced by the sim once per tick.
    pub clock:    SimClock,
}

impl World {
    pub fn new(storage: StorageMap, grid: PassGrid) -> Self {
        Self {
            storage,
            grid,
            agents:       Vec::new(),
            items:        Vec::new(),
            reservations: FxHashMap::default(),
            forbidden:    FxHashSet::default(),
            index:        RTree::new(),
            clock:        SimClock::default(),
        }
    }

    // ── Population ────────────────────────────────────────────────────────

    pub fn add_agent(&mut self, position: Cell, capacity: f32) -> AgentId {
        let id = AgentId::from_index(self.agents.len());
        self.agents.push(AgentState {
            id,
            position,
            carried: None,
            inventory: Vec::new(),
            capacity,
            present: true,
        });
        id
    }

    /// Put a new stack on the ground.  Stacks dropped on a storage cell are
    /// counted into that cell's occupancy.
    pub fn add_item(
        &mut self,
        kind:        ItemKind,
        at:          Cell,
        stack_count: u32,
        unit_mass:   f32,
    ) -> SimResult<ItemId> {
        if self.storage.is_storage(at) {
            self.storage.place(at, kind, stack_count)?;
        }
        let id = ItemId::from_index(self.items.len());
        self.items.push(ItemView { id, kind, holding: Holding::Ground(at), stack_count, unit_mass });
        self.reindex();
        Ok(id)
    }

    /// Rebuild the haulable-item R-tree from live state.
    pub fn reindex(&mut self) {
        let entries: Vec<ItemEntry> = self
            .items
            .iter()
            .filter_map(|item| match item.holding {
                Holding::Ground(at) if !self.storage.is_storage(at) => {
                    Some(ItemEntry { point: at.as_point(), id: item.id })
                }
                _ => None,
            })
            .collect();
        self.index = RTree::bulk_load(entries);
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn agent_state(&self, id: AgentId) -> Option<&AgentState> {
        self.agents.get(id.index())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn storage_map(&self) -> &StorageMap {
        &self.storage
    }

    pub fn storage_map_mut(&mut self) -> &mut StorageMap {
        &mut self.storage
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    fn present_agent(&self, id: AgentId) -> SimResult<&AgentState> {
        self.agents
            .get(id.index())
            .filter(|a| a.present)
            .ok_or(SimError::UnknownAgent(id))
    }

    fn present_agent_mut(&mut self, id: AgentId) -> SimResult<&mut AgentState> {
        self.agents
            .get_mut(id.index())
            .filter(|a| a.present)
            .ok_or(SimError::UnknownAgent(id))
    }

    fn item_mut(&mut self, id: ItemId) -> SimResult<&mut ItemView> {
        self.items.get_mut(id.index()).ok_or(SimError::UnknownItem(id))
    }

    /// Mass of everything `agent` holds, hands and inventory.
    pub fn carried_mass(&self, agent: AgentId) -> f32 {
        let Some(a) = self.agents.get(agent.index()) else {
            return 0.0;
        };
        a.carried
            .iter()
            .chain(a.inventory.iter())
            .filter_map(|id| self.items.get(id.index()))
            .map(ItemView::total_mass)
            .sum()
    }

    // ── Reservations ──────────────────────────────────────────────────────

    pub fn forbid(&mut self, item: ItemId) {
        self.forbidden.insert(item);
    }

    pub fn item_reserved_by(&self, item: ItemId) -> Option<AgentId> {
        self.reservations.get(&item).copied()
    }

    /// Reserve `item` for `agent`.  Returns `false` if someone else holds it.
    pub fn reserve_item(&mut self, item: ItemId, agent: AgentId) -> bool {
        match self.reservations.get(&item) {
            Some(&holder) if holder != agent => false,
            _ => {
                self.reservations.insert(item, agent);
                true
            }
        }
    }

    pub fn release_item(&mut self, item: ItemId) {
        self.reservations.remove(&item);
    }

    /// Drop every item and storage-cell reservation held by `agent`.
    pub fn release_all(&mut self, agent: AgentId) {
        self.reservations.retain(|_, holder| *holder != agent);
        self.storage.release_all(agent);
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Move `agent` one cell toward `target`.  Returns `true` once it stands
    /// on `target`.
    ///
    /// Steps are greedy: diagonal first, then either axis, skipping cells
    /// the grid marks impassable.  An agent boxed in by walls stays put.
    pub fn step_toward(&mut self, agent: AgentId, target: Cell) -> SimResult<bool> {
        let at = self.present_agent(agent)?.position;
        if at == target {
            return Ok(true);
        }
        let dx = (target.x - at.x).signum();
        let dz = (target.z - at.z).signum();
        let options = [
            Cell::new(at.x + dx, at.z + dz),
            Cell::new(at.x + dx, at.z),
            Cell::new(at.x, at.z + dz),
        ];
        let next = options
            .into_iter()
            .find(|&c| c != at && (c == target || self.grid.passable(c)));
        let Some(next) = next else {
            tracing::debug!(%agent, %at, %target, "agent is blocked");
            return Ok(false);
        };
        self.present_agent_mut(agent)?.position = next;
        Ok(next == target)
    }

    // ── Item handling ─────────────────────────────────────────────────────

    fn lift(&mut self, agent: AgentId, item: ItemId, into: Holding) -> SimResult<()> {
        let position = self.present_agent(agent)?.position;
        let view = *self.items.get(item.index()).ok_or(SimError::UnknownItem(item))?;
        let at = match view.holding {
            Holding::Ground(at) => at,
            _ => return Err(SimError::ItemNotThere { item, at: position }),
        };
        if self.storage.is_storage(at) {
            self.storage.take(at, view.stack_count);
        }
        self.item_mut(item)?.holding = into;
        self.release_item(item);
        Ok(())
    }

    /// Pick `item` up into the agent's hands.  The agent must stand on it.
    pub fn pick_up(&mut self, agent: AgentId, item: ItemId) -> SimResult<()> {
        let state = self.present_agent(agent)?;
        if let Some(held) = state.carried {
            return Err(SimError::HandsFull { agent, held });
        }
        let position = state.position;
        let view = self.item_view(item).ok_or(SimError::UnknownItem(item))?;
        if view.position() != Some(position) {
            return Err(SimError::ItemNotThere { item, at: position });
        }
        self.lift(agent, item, Holding::Carried(agent))?;
        self.present_agent_mut(agent)?.carried = Some(item);
        Ok(())
    }

    /// Put `item` into the agent's inventory container, wherever it lies.
    pub fn stow(&mut self, agent: AgentId, item: ItemId) -> SimResult<()> {
        self.lift(agent, item, Holding::Inventory(agent))?;
        self.present_agent_mut(agent)?.inventory.push(item);
        Ok(())
    }

    fn set_down(&mut self, agent: AgentId, item: ItemId, at: Cell) -> SimResult<()> {
        let view = self.item_view(item).ok_or(SimError::UnknownItem(item))?;
        if self.storage.is_storage(at) {
            self.storage.place(at, view.kind, view.stack_count)?;
            if self.storage.reserved_by(at) == Some(agent) {
                self.storage.release(at);
            }
        }
        self.item_mut(item)?.holding = Holding::Ground(at);
        Ok(())
    }

    /// Drop whatever is in the agent's hands on `at`.
    pub fn drop_carried(&mut self, agent: AgentId, at: Cell) -> SimResult<ItemId> {
        let item = self
            .present_agent(agent)?
            .carried
            .ok_or(SimError::NotHolding { agent, item: ItemId::INVALID })?;
        self.set_down(agent, item, at)?;
        self.present_agent_mut(agent)?.carried = None;
        Ok(item)
    }

    /// Take `item` out of the agent's inventory and drop it on `at`.
    pub fn unload(&mut self, agent: AgentId, item: ItemId, at: Cell) -> SimResult<()> {
        let slot = self
            .present_agent(agent)?
            .inventory
            .iter()
            .position(|&i| i == item)
            .ok_or(SimError::NotHolding { agent, item })?;
        self.set_down(agent, item, at)?;
        self.present_agent_mut(agent)?.inventory.remove(slot);
        Ok(())
    }

    /// Empty hands and inventory onto the agent's own cell, bypassing
    /// storage bookkeeping.  Used when a task queue is torn down.
    pub fn spill(&mut self, agent: AgentId) -> SimResult<Vec<ItemId>> {
        let state = self.present_agent_mut(agent)?;
        let at = state.position;
        let mut dropped: Vec<ItemId> = state.carried.take().into_iter().collect();
        dropped.append(&mut state.inventory);
        for &item in &dropped {
            self.item_mut(item)?.holding = Holding::Ground(at);
        }
        Ok(dropped)
    }

    /// Mark `agent` as gone.  Held items are spilled and reservations freed.
    pub fn remove_agent(&mut self, agent: AgentId) -> SimResult<Vec<ItemId>> {
        let dropped = self.spill(agent)?;
        self.release_all(agent);
        self.present_agent_mut(agent)?.present = false;
        Ok(dropped)
    }

    pub fn item_view(&self, id: ItemId) -> Option<ItemView> {
        self.items.get(id.index()).copied()
    }
}

// ── HaulHost ──────────────────────────────────────────────────────────────────

impl HaulHost for World {
    type Storage = StorageMap;

    fn agent(&self, id: AgentId) -> Option<AgentView> {
        let a = self.agents.get(id.index()).filter(|a| a.present)?;
        Some(AgentView {
            id,
            position:     a.position,
            carried:      a.carried,
            carried_mass: self.carried_mass(id),
            capacity:     a.capacity,
        })
    }

    fn item(&self, id: ItemId) -> Option<ItemView> {
        self.item_view(id)
    }

    fn inventory_of(&self, agent: AgentId) -> Vec<ItemView> {
        self.agents
            .get(agent.index())
            .map(|a| a.inventory.iter().filter_map(|&id| self.item_view(id)).collect())
            .unwrap_or_default()
    }

    /// Unstored ground items, nearest to the agent first.
    fn candidate_haulables(&self, agent: AgentId) -> Vec<ItemView> {
        let Some(a) = self.agents.get(agent.index()).filter(|a| a.present) else {
            return Vec::new();
        };
        self.index
            .nearest_neighbor_iter(&a.position.as_point())
            .filter_map(|e| self.item_view(e.id))
            .filter(|item| item.position().is_some())
            .filter(|item| self.storage.current_priority_of(item) == StoragePriority::Unstored)
            .collect()
    }

    fn can_reserve(&self, agent: AgentId, item: ItemId) -> bool {
        self.reservations.get(&item).is_none_or(|&holder| holder == agent)
    }

    fn is_forbidden(&self, _agent: AgentId, item: ItemId) -> bool {
        self.forbidden.contains(&item)
    }

    fn is_haul_eligible(&self, agent: AgentId, item: &ItemView) -> bool {
        item.stack_count > 0 && self.agents.get(agent.index()).is_some_and(|a| a.present)
    }

    fn storage(&self) -> &StorageMap {
        &self.storage
    }

    fn grid(&self) -> &PassGrid {
        &self.grid
    }

    fn now(&self) -> Tick {
        self.clock.now()
    }
}
