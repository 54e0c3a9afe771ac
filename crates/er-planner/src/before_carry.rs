//! Before-carry hauling: before taking an item to a carry job, first move
//! it to storage that sits closer to where it is needed.

use er_core::{AgentId, Cell, ItemId, PlannerSettings};
use er_detour::{DetourKind, DetourTable};
use er_storage::{CellQuery, SearchStyle, StorageCellFinder, StorageView};

use crate::{DetourReason, HaulAction, HaulHost};

pub struct BeforeCarryPlanner<'a, H: HaulHost> {
    pub host:            &'a H,
    pub settings:        &'a PlannerSettings,
    pub finder:          &'a StorageCellFinder,
    pub inventory_batch: bool,
}

impl<'a, H: HaulHost> BeforeCarryPlanner<'a, H> {
    /// Plan a single haul of `item` to a store cell nearer `carry_target`.
    pub fn plan(
        &self,
        agent_id:     AgentId,
        carry_target: Cell,
        item_id:      ItemId,
        detours:      &mut DetourTable,
    ) -> Option<HaulAction> {
        if !self.settings.before_carry_enabled {
            return None;
        }
        let agent = self.host.agent(agent_id)?;
        let item = self.host.item(item_id)?;
        if item.in_inventory_of(agent_id) {
            return None;
        }
        // Leave room for one more unit: no room means no extras worth a detour.
        if agent.carried_mass + item.total_mass() + item.unit_mass > agent.capacity {
            return None;
        }
        let item_cell = item.position()?;

        let storage = self.host.storage();
        let query = CellQuery::opportunity(&item, agent_id, agent.position)
            .with_target(carry_target)
            .with_floor(storage.current_priority_of(&item))
            .with_style(SearchStyle::BeforeCarry)
            .accurate();
        let store_cell = self.finder.find_closest_acceptable_cell(storage, &query, None)?;

        if store_cell.distance_sq(carry_target) >= item_cell.distance_sq(carry_target) {
            return None;
        }

        let mut kind = DetourKind::BeforeCarry { carry_target };
        if self.inventory_batch {
            kind = kind.with_inventory_batch();
        }
        let detour = detours.get_or_insert(agent_id);
        detour.activate(kind, agent.position);
        detour.record_type_cell(item.kind, store_cell);
        tracing::debug!(agent = %agent_id, item = %item_id, %store_cell, "before-carry committed");

        Some(HaulAction {
            agent:  agent_id,
            item:   item_id,
            from:   item_cell,
            store_cell,
            reason: DetourReason::BeforeCarry,
        })
    }
}
