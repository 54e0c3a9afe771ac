//! Haul actions returned to the host.

use std::fmt;

use er_core::{AgentId, Cell, ItemId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DetourReason {
    Opportunity,
    BeforeCarry,
}

impl fmt::Display for DetourReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetourReason::Opportunity => f.write_str("opportunity"),
            DetourReason::BeforeCarry => f.write_str("before-carry"),
        }
    }
}

/// "Pick up `item` at `from` and drop it on `store_cell`."
///
/// The host queues this ahead of the agent's current task and is
/// responsible for reserving the item and the cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HaulAction {
    pub agent:      AgentId,
    pub item:       ItemId,
    pub from:       Cell,
    pub store_cell: Cell,
    pub reason:     DetourReason,
}
