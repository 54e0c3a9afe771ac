//! In-memory storage model and builder.
//!
//! # Data layout
//!
//! Groups are kept sorted by descending priority (stable with respect to
//! insertion order), which is the order every search visits them in.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps each storage cell to the position of its
//! group in `groups`.  It answers `group_at(cell)`, which is what decides an
//! item's current storage priority.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use er_core::{AgentId, Cell, GroupId, ItemKind, ItemView};

use crate::{
    Acceptance, GroupKind, StorageError, StorageGroup, StoragePriority, StorageResult, StorageView,
};

/// Stack limit for kinds without an explicit entry.
pub const DEFAULT_STACK_LIMIT: u32 = 75;

// ── R-tree cell entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a storage cell and its group's slot.
#[derive(Clone)]
struct CellEntry {
    point: [f32; 2],
    slot:  usize,
}

impl RTreeObject for CellEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CellEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dz = self.point[1] - point[1];
        dx * dx + dz * dz
    }
}

// ── CellContents ──────────────────────────────────────────────────────────────

/// What currently lies on a storage cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellContents {
    pub kind:  ItemKind,
    pub count: u32,
}

// ── StorageMap ────────────────────────────────────────────────────────────────

/// Storage groups plus per-cell occupancy and reservations.
///
/// Do not construct directly; use [`StorageMapBuilder`].
pub struct StorageMap {
    groups:       Vec<StorageGroup>,
    slot_of:      FxHashMap<GroupId, usize>,
    index:        RTree<CellEntry>,
    contents:     FxHashMap<Cell, CellContents>,
    reserved:     FxHashMap<Cell, AgentId>,
    stack_limits: FxHashMap<ItemKind, u32>,
}

impl StorageMap {
    pub fn empty() -> Self {
        Self {
            groups:       Vec::new(),
            slot_of:      FxHashMap::default(),
            index:        RTree::new(),
            contents:     FxHashMap::default(),
            reserved:     FxHashMap::default(),
            stack_limits: FxHashMap::default(),
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, id: GroupId) -> Option<&StorageGroup> {
        self.slot_of.get(&id).map(|&slot| &self.groups[slot])
    }

    /// Mutable access for host-side settings changes (priority edits are not
    /// supported here because they would break the sort order).
    pub fn set_acceptance(&mut self, id: GroupId, acceptance: Acceptance) -> bool {
        match self.slot_of.get(&id) {
            Some(&slot) => {
                self.groups[slot].acceptance = acceptance;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_storage(&self, cell: Cell) -> bool {
        self.slot_at(cell).is_some()
    }

    fn slot_at(&self, cell: Cell) -> Option<usize> {
        self.index.locate_at_point(&cell.as_point()).map(|e| e.slot)
    }

    pub fn stack_limit(&self, kind: ItemKind) -> u32 {
        self.stack_limits.get(&kind).copied().unwrap_or(DEFAULT_STACK_LIMIT)
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    pub fn contents(&self, cell: Cell) -> Option<CellContents> {
        self.contents.get(&cell).copied()
    }

    /// How many units of `kind` still fit on `cell`.
    pub fn room_for(&self, cell: Cell, kind: ItemKind) -> u32 {
        let limit = self.stack_limit(kind);
        match self.contents.get(&cell) {
            None                          => limit,
            Some(c) if c.kind == kind     => limit.saturating_sub(c.count),
            Some(_)                       => 0,
        }
    }

    /// Drop `count` units of `kind` on a storage cell.
    pub fn place(&mut self, cell: Cell, kind: ItemKind, count: u32) -> StorageResult<()> {
        if !self.is_storage(cell) {
            return Err(StorageError::NotStorage(cell));
        }
        if let Some(c) = self.contents.get(&cell) {
            if c.kind != kind {
                return Err(StorageError::KindMismatch { cell, held: c.kind, kind });
            }
        }
        let room = self.room_for(cell, kind);
        if count > room {
            return Err(StorageError::Overfull { cell, room, count });
        }
        self.contents
            .entry(cell)
            .and_modify(|c| c.count += count)
            .or_insert(CellContents { kind, count });
        Ok(())
    }

    /// Remove up to `count` units from `cell`; returns how many were removed.
    pub fn take(&mut self, cell: Cell, count: u32) -> u32 {
        let Some(c) = self.contents.get_mut(&cell) else {
            return 0;
        };
        let taken = count.min(c.count);
        c.count -= taken;
        if c.count == 0 {
            self.contents.remove(&cell);
        }
        taken
    }

    // ── Reservations ──────────────────────────────────────────────────────

    pub fn reserved_by(&self, cell: Cell) -> Option<AgentId> {
        self.reserved.get(&cell).copied()
    }

    /// Reserve `cell` for `agent`.  Re-reserving one's own cell is a no-op.
    pub fn reserve(&mut self, cell: Cell, agent: AgentId) -> StorageResult<()> {
        if !self.is_storage(cell) {
            return Err(StorageError::NotStorage(cell));
        }
        match self.reserved.get(&cell) {
            Some(&holder) if holder != agent => Err(StorageError::Reserved { cell, holder }),
            _ => {
                self.reserved.insert(cell, agent);
                Ok(())
            }
        }
    }

    pub fn release(&mut self, cell: Cell) {
        self.reserved.remove(&cell);
    }

    /// Release every reservation held by `agent`.
    pub fn release_all(&mut self, agent: AgentId) {
        self.reserved.retain(|_, holder| *holder != agent);
    }
}

impl StorageView for StorageMap {
    fn groups_by_priority(&self) -> &[StorageGroup] {
        &self.groups
    }

    fn group_at(&self, cell: Cell) -> Option<&StorageGroup> {
        self.slot_at(cell).map(|slot| &self.groups[slot])
    }

    fn is_good_store_cell(&self, cell: Cell, agent: AgentId, item: &ItemView) -> bool {
        if !self.is_storage(cell) {
            return false;
        }
        if self.reserved.get(&cell).is_some_and(|&holder| holder != agent) {
            return false;
        }
        self.room_for(cell, item.kind) > 0
    }
}

// ── StorageMapBuilder ─────────────────────────────────────────────────────────

/// Construct a [`StorageMap`] group by group, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use er_core::Cell;
/// use er_storage::{Acceptance, GroupKind, StorageMapBuilder, StoragePriority};
///
/// let mut b = StorageMapBuilder::new();
/// b.add_group("yard", StoragePriority::Normal, GroupKind::Stockpile,
///             Acceptance::All, StorageMapBuilder::rect(0, 0, 1, 1));
/// let map = b.build().unwrap();
/// assert_eq!(map.group_count(), 1);
/// assert!(map.is_storage(Cell::new(1, 1)));
/// ```
pub struct StorageMapBuilder {
    groups:       Vec<StorageGroup>,
    stack_limits: FxHashMap<ItemKind, u32>,
}

impl StorageMapBuilder {
    pub fn new() -> Self {
        Self { groups: Vec::new(), stack_limits: FxHashMap::default() }
    }

    /// Cells of the inclusive rectangle, row by row.
    pub fn rect(x0: i32, z0: i32, x1: i32, z1: i32) -> Vec<Cell> {
        let mut cells = Vec::new();
        for z in z0.min(z1)..=z0.max(z1) {
            for x in x0.min(x1)..=x0.max(x1) {
                cells.push(Cell::new(x, z));
            }
        }
        cells
    }

    /// Add a group and return its id (sequential from 0).
    pub fn add_group(
        &mut self,
        label:      impl Into<String>,
        priority:   StoragePriority,
        kind:       GroupKind,
        acceptance: Acceptance,
        cells:      Vec<Cell>,
    ) -> GroupId {
        let id = GroupId::from_index(self.groups.len());
        self.groups.push(StorageGroup {
            id,
            label: label.into(),
            priority,
            kind,
            acceptance,
            cells,
        });
        id
    }

    /// Convenience: an accept-all stockpile.
    pub fn add_stockpile(&mut self, label: &str, priority: StoragePriority, cells: Vec<Cell>) -> GroupId {
        self.add_group(label, priority, GroupKind::Stockpile, Acceptance::All, cells)
    }

    pub fn stack_limit(&mut self, kind: ItemKind, limit: u32) -> &mut Self {
        self.stack_limits.insert(kind, limit.max(1));
        self
    }

    /// Validate, sort groups by descending priority, and bulk-load the R-tree.
    pub fn build(self) -> StorageResult<StorageMap> {
        let mut owner: FxHashMap<Cell, GroupId> = FxHashMap::default();
        for g in &self.groups {
            if g.cells.is_empty() {
                return Err(StorageError::EmptyGroup(g.label.clone()));
            }
            for &cell in &g.cells {
                if let Some(&existing) = owner.get(&cell) {
                    return Err(StorageError::DuplicateCell { cell, existing });
                }
                owner.insert(cell, g.id);
            }
        }

        let mut groups = self.groups;
        groups.sort_by(|a, b| b.priority.cmp(&a.priority));

        let slot_of: FxHashMap<GroupId, usize> =
            groups.iter().enumerate().map(|(slot, g)| (g.id, slot)).collect();

        let entries: Vec<CellEntry> = groups
            .iter()
            .enumerate()
            .flat_map(|(slot, g)| {
                g.cells.iter().map(move |c| CellEntry { point: c.as_point(), slot })
            })
            .collect();

        Ok(StorageMap {
            groups,
            slot_of,
            index: RTree::bulk_load(entries),
            contents: FxHashMap::default(),
            reserved: FxHashMap::default(),
            stack_limits: self.stack_limits,
        })
    }
}

impl Default for StorageMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
