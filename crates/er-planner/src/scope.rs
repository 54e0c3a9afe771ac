//! The call-context stack and the decision cache it scopes.
//!
//! Store searches can re-enter the planner from several nested phases of an
//! inventory-batch job.  Each entry pushes its [`CallPhase`] and pops it on
//! the way out; the store-search hook looks at the innermost phase to decide
//! what to do.  Resolutions are cached per item until the outermost phase
//! pops, and so are the cells handed out, so two items resolved in one
//! scope never share a store cell.

use rustc_hash::{FxHashMap, FxHashSet};

use er_core::{Cell, ItemId};

/// Which caller is on the stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CallPhase {
    OpportunityPlan,
    BeforeCarryPlan,
    /// Inventory batch: looking for items worth picking up.
    BatchScan,
    /// Inventory batch: committing an item to the batch.
    BatchAllocate,
    /// Inventory batch: choosing where to drop carried items.
    BatchUnload,
}

// ── DecisionCache ─────────────────────────────────────────────────────────────

/// Item → resolved store cell (or `None` for "resolved to nothing").
#[derive(Debug, Default)]
pub struct DecisionCache {
    cells: FxHashMap<ItemId, Option<Cell>>,
}

impl DecisionCache {
    /// `Some(resolution)` if the item has been resolved in this scope.
    pub fn get(&self, item: ItemId) -> Option<Option<Cell>> {
        self.cells.get(&item).copied()
    }

    pub fn insert(&mut self, item: ItemId, cell: Option<Cell>) {
        self.cells.insert(item, cell);
    }

    pub fn evict(&mut self, item: ItemId) {
        self.cells.remove(&item);
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ── SearchScope ───────────────────────────────────────────────────────────────

/// LIFO stack of active call phases plus the cache and exclusions they
/// share.
#[derive(Debug, Default)]
pub struct SearchScope {
    stack:    Vec<CallPhase>,
    cache:    DecisionCache,
    excluded: FxHashSet<Cell>,
}

impl SearchScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, phase: CallPhase) {
        self.stack.push(phase);
    }

    /// Pop the innermost phase.  The cache and the exclusions are cleared
    /// when this pop empties the stack, and only then.
    pub fn pop(&mut self) -> Option<CallPhase> {
        let phase = self.stack.pop();
        if phase.is_none() {
            tracing::warn!("call-context pop on an empty stack");
        }
        if self.stack.is_empty() {
            self.cache.clear();
            self.excluded.clear();
        }
        phase
    }

    /// Run `f` with `phase` pushed; the phase is popped however `f` returns.
    pub fn enter<R>(&mut self, phase: CallPhase, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push(phase);
        let out = f(self);
        self.pop();
        out
    }

    #[inline]
    pub fn top(&self) -> Option<CallPhase> {
        self.stack.last().copied()
    }

    /// `true` if `phase` is anywhere on the stack.
    pub fn contains(&self, phase: CallPhase) -> bool {
        self.stack.contains(&phase)
    }

    /// `true` while the planner's own plan call is on the stack.
    pub fn in_plan(&self) -> bool {
        self.contains(CallPhase::OpportunityPlan) || self.contains(CallPhase::BeforeCarryPlan)
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn cache(&self) -> &DecisionCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut DecisionCache {
        &mut self.cache
    }

    /// Store cells already handed out in this scope.
    pub fn excluded(&self) -> &FxHashSet<Cell> {
        &self.excluded
    }

    pub fn excluded_mut(&mut self) -> &mut FxHashSet<Cell> {
        &mut self.excluded
    }

    /// Hand `cell` back, e.g. after its allocation was rejected.
    pub fn release(&mut self, cell: Cell) {
        self.excluded.remove(&cell);
    }
}
