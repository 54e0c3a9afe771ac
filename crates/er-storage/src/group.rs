//! Storage groups: a priority, an acceptance predicate, a kind tag, and the
//! cells that belong to the group.

use std::fmt;

use rustc_hash::FxHashSet;

use er_core::{Cell, GroupId, GroupKindFilter, ItemKind};

// ── StoragePriority ───────────────────────────────────────────────────────────

/// Storage priority.  `Unstored` is the priority of an item that is not
/// sitting in a group that accepts it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum StoragePriority {
    #[default]
    Unstored,
    Low,
    Normal,
    Preferred,
    Important,
    Critical,
}

impl StoragePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            StoragePriority::Unstored  => "unstored",
            StoragePriority::Low       => "low",
            StoragePriority::Normal    => "normal",
            StoragePriority::Preferred => "preferred",
            StoragePriority::Important => "important",
            StoragePriority::Critical  => "critical",
        }
    }
}

impl fmt::Display for StoragePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── GroupKind ─────────────────────────────────────────────────────────────────

/// The parent-kind tag used for allow/deny filtering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupKind {
    /// An open-area zone.
    Stockpile,
    /// A dedicated storage building, identified by its def name.
    Building { def: String },
}

impl GroupKind {
    /// Does `filter` let searches use a group of this kind?
    pub fn allowed_by(&self, filter: &GroupKindFilter) -> bool {
        match self {
            GroupKind::Stockpile       => filter.allows_stockpile(),
            GroupKind::Building { def } => filter.allows_building(def),
        }
    }
}

// ── Acceptance ────────────────────────────────────────────────────────────────

/// Which item kinds a group accepts.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Acceptance {
    #[default]
    All,
    Only(FxHashSet<ItemKind>),
    Except(FxHashSet<ItemKind>),
}

impl Acceptance {
    pub fn only(kinds: impl IntoIterator<Item = ItemKind>) -> Self {
        Acceptance::Only(kinds.into_iter().collect())
    }

    pub fn except(kinds: impl IntoIterator<Item = ItemKind>) -> Self {
        Acceptance::Except(kinds.into_iter().collect())
    }

    #[inline]
    pub fn accepts(&self, kind: ItemKind) -> bool {
        match self {
            Acceptance::All          => true,
            Acceptance::Only(set)    => set.contains(&kind),
            Acceptance::Except(set)  => !set.contains(&kind),
        }
    }
}

// ── StorageGroup ──────────────────────────────────────────────────────────────

/// One stockpile zone or storage building.  Read-only to the planner.
#[derive(Clone, Debug)]
pub struct StorageGroup {
    pub id:         GroupId,
    pub label:      String,
    pub priority:   StoragePriority,
    pub kind:       GroupKind,
    pub acceptance: Acceptance,
    /// Cells in the host's list order.  The finder scans them in this order.
    pub cells:      Vec<Cell>,
}

impl StorageGroup {
    #[inline]
    pub fn accepts(&self, kind: ItemKind) -> bool {
        self.acceptance.accepts(kind)
    }
}
