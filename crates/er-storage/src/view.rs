//! The host storage interface.

use er_core::{AgentId, Cell, ItemView};

use crate::{StorageGroup, StoragePriority};

/// Read access to the host's storage subsystem.
///
/// [`StorageMap`][crate::StorageMap] is the in-crate implementation; hosts
/// with their own storage model implement this trait directly.
pub trait StorageView {
    /// All groups, highest priority first.  Groups of equal priority keep a
    /// stable order between calls.
    fn groups_by_priority(&self) -> &[StorageGroup];

    /// The group owning `cell`, if any.
    fn group_at(&self, cell: Cell) -> Option<&StorageGroup>;

    /// `true` if `agent` could drop `item` on `cell` right now (not reserved
    /// by someone else, empty or holding a compatible stack with room).
    fn is_good_store_cell(&self, cell: Cell, agent: AgentId, item: &ItemView) -> bool;

    /// Priority of the storage the item currently sits in.
    ///
    /// Held items and items in a group that does not accept them are
    /// `Unstored`.
    fn current_priority_of(&self, item: &ItemView) -> StoragePriority {
        item.position()
            .and_then(|c| self.group_at(c))
            .filter(|g| g.accepts(item.kind))
            .map(|g| g.priority)
            .unwrap_or(StoragePriority::Unstored)
    }
}
