//! Read-only snapshots of host-owned items.
//!
//! The planner never creates or destroys items.  Hosts hand it an
//! [`ItemView`] per lookup; the view is only valid for the current decision
//! point.

use crate::{AgentId, Cell, ItemId, ItemKind};

/// Where an item currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Holding {
    /// Lying on the map.
    Ground(Cell),
    /// In an agent's hands (the single carried stack).
    Carried(AgentId),
    /// In an agent's carried-inventory container.
    Inventory(AgentId),
}

/// A transportable item stack as seen by the planner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ItemView {
    pub id:          ItemId,
    pub kind:        ItemKind,
    pub holding:     Holding,
    pub stack_count: u32,
    /// Mass of one unit of the stack.
    pub unit_mass:   f32,
}

impl ItemView {
    /// Map position, or `None` while held by an agent.
    #[inline]
    pub fn position(&self) -> Option<Cell> {
        match self.holding {
            Holding::Ground(c) => Some(c),
            Holding::Carried(_) | Holding::Inventory(_) => None,
        }
    }

    #[inline]
    pub fn total_mass(&self) -> f32 {
        self.unit_mass * self.stack_count as f32
    }

    /// `true` if `agent` has this item in its inventory container.
    #[inline]
    pub fn in_inventory_of(&self, agent: AgentId) -> bool {
        self.holding == Holding::Inventory(agent)
    }
}
