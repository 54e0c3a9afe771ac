//! The `Detour` record and the chain tracker.
//!
//! # Trip legs
//!
//! For a chain of hauls picked up in order `item₁ … itemₙ` and unloaded in
//! the greedy order `store₁ … storeₙ`:
//!
//! ```text
//! start ─▶ item₁ ─▶ … ─▶ itemₙ ─▶ store₁ ─▶ … ─▶ storeₙ ─▶ target
//! └─ start_to_last_item ─┘ └─ last_item_to_first_store
//!                               └─ first_store_to_last_store ─┘ └─ last_store_to_target
//! ```
//!
//! `total` is the sum of all four legs; `new_legs` leaves out the
//! `last_item_to_first_store` leg, which the agent would walk anyway if the
//! hauls were separate jobs.  All legs are straight-line distances.

use rustc_hash::FxHashMap;

use er_core::{Cell, ItemId, ItemKind, ItemView, PlannerSettings, Tick};

use crate::{DetourError, DetourKind, DetourResult};

// ── Haul ──────────────────────────────────────────────────────────────────────

/// One (item, store cell) pair in a detour chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Haul {
    pub item:       ItemId,
    pub kind:       ItemKind,
    /// Where the item was picked up.
    pub item_cell:  Cell,
    pub store_cell: Cell,
}

// ── TripBudget ────────────────────────────────────────────────────────────────

/// The two chain ratios, as multiples of the original trip.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TripBudget {
    pub max_total_trip_pct: f32,
    pub max_new_legs_pct:   f32,
}

impl TripBudget {
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self {
            max_total_trip_pct: settings.max_total_trip_pct_orig_trip,
            max_new_legs_pct:   settings.max_new_legs_pct_orig_trip,
        }
    }

    /// `true` if both ratios hold for `legs` against `orig_trip`.
    pub fn admits(&self, legs: &TripLegs, orig_trip: f32) -> bool {
        legs.total() <= orig_trip * self.max_total_trip_pct
            && legs.new_legs() <= orig_trip * self.max_new_legs_pct
    }
}

// ── TripLegs ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct TripLegs {
    pub start_to_last_item:        f32,
    pub last_item_to_first_store:  f32,
    pub first_store_to_last_store: f32,
    pub last_store_to_target:      f32,
}

impl TripLegs {
    #[inline]
    pub fn total(&self) -> f32 {
        self.start_to_last_item
            + self.last_item_to_first_store
            + self.first_store_to_last_store
            + self.last_store_to_target
    }

    #[inline]
    pub fn new_legs(&self) -> f32 {
        self.start_to_last_item + self.first_store_to_last_store + self.last_store_to_target
    }
}

/// Result of [`Detour::track_if_opportune`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TrackOutcome {
    Accepted { legs: TripLegs },
    /// The chain was restored to its state before the call.
    Rejected { legs: TripLegs },
}

impl TrackOutcome {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, TrackOutcome::Accepted { .. })
    }
}

/// How to revert one tentative insertion.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Undo {
    InsertedFront,
    InsertedBack,
    Replaced { at: usize, previous: Haul },
}

// ── Detour ────────────────────────────────────────────────────────────────────

/// An agent's detour.  `Inactive` detours have no hauls and no type cells.
#[derive(Clone, Debug, Default)]
pub struct Detour {
    pub kind:                DetourKind,
    /// Agent position when the detour began.
    pub start:               Cell,
    /// Straight-line `start → destination`, fixed at activation.
    pub orig_trip:           f32,
    hauls:                   Vec<Haul>,
    type_to_cell:            FxHashMap<ItemKind, Cell>,
    /// When the last opportunity detour ended.  Survives deactivation.
    pub opportunity_done_at: Option<Tick>,
}

impl Detour {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.kind.is_active()
    }

    pub fn hauls(&self) -> &[Haul] {
        &self.hauls
    }

    pub fn type_cell(&self, kind: ItemKind) -> Option<Cell> {
        self.type_to_cell.get(&kind).copied()
    }

    pub fn type_cells(&self) -> &FxHashMap<ItemKind, Cell> {
        &self.type_to_cell
    }

    /// Start a new detour, discarding any previous chain.
    pub fn activate(&mut self, kind: DetourKind, start: Cell) {
        self.kind      = kind;
        self.start     = start;
        self.orig_trip = kind.destination().map_or(0.0, |d| start.distance(d));
        self.hauls.clear();
        self.type_to_cell.clear();
    }

    /// End the detour.  Opportunity variants stamp `opportunity_done_at`.
    pub fn deactivate(&mut self, now: Tick) {
        if self.kind.is_opportunity() {
            self.opportunity_done_at = Some(now);
        }
        self.kind      = DetourKind::Inactive;
        self.orig_trip = 0.0;
        self.hauls.clear();
        self.type_to_cell.clear();
    }

    /// `true` while a finished opportunity is younger than `ticks`.
    pub fn in_debounce(&self, now: Tick, ticks: u64) -> bool {
        self.opportunity_done_at.is_some_and(|done| now.within(done, ticks))
    }

    /// Remember a representative store cell for `kind` (overwrites).
    pub fn record_type_cell(&mut self, kind: ItemKind, cell: Cell) {
        self.type_to_cell.insert(kind, cell);
    }

    pub fn forget_type_cell(&mut self, kind: ItemKind) {
        self.type_to_cell.remove(&kind);
    }

    // ── Chain tracking ────────────────────────────────────────────────────

    /// Add `haul` to the chain if the whole trip stays within `budget`.
    ///
    /// The carried item goes to the front (it is unloaded first), any other
    /// item to the back.  A repeat notification for the item already at that
    /// end replaces the entry.  On rejection the chain and the type cells are
    /// left exactly as they were.
    ///
    /// # Errors
    ///
    /// `NotChainCapable` for kinds without a job target; `RollbackMismatch`
    /// if the rejected entry cannot be found where it was inserted.
    pub fn track_if_opportune(
        &mut self,
        haul:    Haul,
        carried: Option<ItemId>,
        budget:  &TripBudget,
    ) -> DetourResult<TrackOutcome> {
        if !self.kind.is_chain_capable() {
            return Err(DetourError::NotChainCapable(self.kind));
        }

        let undo = self.insert(haul, carried == Some(haul.item));
        let legs = self.trip_legs(carried);

        if !budget.admits(&legs, self.orig_trip) {
            self.rollback(undo, haul.item)?;
            tracing::debug!(
                item = %haul.item,
                total = legs.total(),
                new_legs = legs.new_legs(),
                orig_trip = self.orig_trip,
                "haul rejected, chain restored"
            );
            return Ok(TrackOutcome::Rejected { legs });
        }

        self.type_to_cell.insert(haul.kind, haul.store_cell);
        Ok(TrackOutcome::Accepted { legs })
    }

    fn insert(&mut self, haul: Haul, front: bool) -> Undo {
        let at = if front { 0 } else { self.hauls.len().saturating_sub(1) };
        match self.hauls.get(at) {
            Some(existing) if existing.item == haul.item => {
                let previous = std::mem::replace(&mut self.hauls[at], haul);
                Undo::Replaced { at, previous }
            }
            _ if front => {
                self.hauls.insert(0, haul);
                Undo::InsertedFront
            }
            _ => {
                self.hauls.push(haul);
                Undo::InsertedBack
            }
        }
    }

    /// Revert `undo`, which must have inserted `item`.
    pub(crate) fn rollback(&mut self, undo: Undo, item: ItemId) -> DetourResult<()> {
        let at = match undo {
            Undo::InsertedFront        => 0,
            Undo::InsertedBack         => self.hauls.len().saturating_sub(1),
            Undo::Replaced { at, .. }  => at,
        };
        let found = self.hauls.get(at).map(|h| h.item);
        if found != Some(item) {
            tracing::error!(expected = %item, ?found, "detour rollback mismatch");
            return Err(DetourError::RollbackMismatch { expected: item, found });
        }
        match undo {
            Undo::InsertedFront | Undo::InsertedBack => {
                self.hauls.remove(at);
            }
            Undo::Replaced { previous, .. } => self.hauls[at] = previous,
        }
        Ok(())
    }

    /// Greedy nearest-neighbour unload order, as indices into `hauls`.
    ///
    /// Starts at the carried item's entry (or the first entry), then keeps
    /// taking the entry whose store cell is nearest the last one chosen.
    /// Ties go to the earlier entry.
    pub fn unload_order(&self, carried: Option<ItemId>) -> Vec<usize> {
        if self.hauls.is_empty() {
            return Vec::new();
        }
        let first = carried
            .and_then(|id| self.hauls.iter().position(|h| h.item == id))
            .unwrap_or(0);

        let mut order = Vec::with_capacity(self.hauls.len());
        let mut remaining: Vec<usize> = (0..self.hauls.len()).filter(|&i| i != first).collect();
        order.push(first);
        let mut last = self.hauls[first].store_cell;

        while let Some((slot, next)) = remaining
            .iter()
            .enumerate()
            .min_by_key(|&(_, &i)| last.distance_sq(self.hauls[i].store_cell))
            .map(|(slot, &i)| (slot, i))
        {
            remaining.remove(slot);
            order.push(next);
            last = self.hauls[next].store_cell;
        }
        order
    }

    /// Straight-line legs of the current chain toward the detour destination.
    pub fn trip_legs(&self, carried: Option<ItemId>) -> TripLegs {
        let Some(last_item) = self.hauls.last() else {
            return TripLegs::default();
        };
        let target = self.kind.destination().unwrap_or(self.start);

        let mut start_to_last_item = 0.0;
        let mut at = self.start;
        for h in &self.hauls {
            start_to_last_item += at.distance(h.item_cell);
            at = h.item_cell;
        }

        let order = self.unload_order(carried);
        let first_store = self.hauls[order[0]].store_cell;
        let mut first_store_to_last_store = 0.0;
        let mut at = first_store;
        for &i in &order[1..] {
            first_store_to_last_store += at.distance(self.hauls[i].store_cell);
            at = self.hauls[i].store_cell;
        }

        TripLegs {
            start_to_last_item,
            last_item_to_first_store: last_item.item_cell.distance(first_store),
            first_store_to_last_store,
            last_store_to_target: at.distance(target),
        }
    }

    /// Which inventory item to unload next when standing at `at`.
    ///
    /// Items with a recorded type cell come first, nearest cell first; the
    /// rest follow in inventory order.
    pub fn next_unload(&self, inventory: &[ItemView], at: Cell) -> Option<ItemId> {
        inventory
            .iter()
            .min_by_key(|item| match self.type_cell(item.kind) {
                Some(cell) => (0, at.distance_sq(cell)),
                None       => (1, 0),
            })
            .map(|item| item.id)
    }
}
