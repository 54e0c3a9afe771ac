//! The `HaulHost` trait — everything the planner reads from the host.

use er_core::{AgentId, Cell, ItemId, ItemView, Tick};
use er_spatial::PassGrid;
use er_storage::StorageView;

/// Snapshot of one agent at a decision point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentView {
    pub id:           AgentId,
    pub position:     Cell,
    /// The single stack in the agent's hands, if any.
    pub carried:      Option<ItemId>,
    /// Mass of everything the agent is holding (hands and inventory).
    pub carried_mass: f32,
    pub capacity:     f32,
}

/// Host queries consumed by the planner.
///
/// All methods are reads.  Reservation and task bookkeeping stay on the host
/// side; the planner only returns [`HaulAction`][crate::HaulAction]s.
pub trait HaulHost {
    type Storage: StorageView;

    fn agent(&self, id: AgentId) -> Option<AgentView>;

    fn item(&self, id: ItemId) -> Option<ItemView>;

    /// Items in the agent's carried-inventory container.
    fn inventory_of(&self, agent: AgentId) -> Vec<ItemView>;

    /// Items the agent could potentially haul right now.  The planner reads
    /// this once per plan; order is the host's choice.
    fn candidate_haulables(&self, agent: AgentId) -> Vec<ItemView>;

    fn can_reserve(&self, agent: AgentId, item: ItemId) -> bool;

    fn is_forbidden(&self, agent: AgentId, item: ItemId) -> bool;

    /// Host-specific hauling rules (job restrictions, item flags).
    fn is_haul_eligible(&self, agent: AgentId, item: &ItemView) -> bool;

    fn storage(&self) -> &Self::Storage;

    fn grid(&self) -> &PassGrid;

    fn now(&self) -> Tick;
}
