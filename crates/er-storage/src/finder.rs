//! The priority-aware storage cell finder.
//!
//! # Cell selection
//!
//! Within a group, cells are scanned in the group's list order.  A cell is a
//! candidate when it is no farther from the reference point than the best
//! cell found so far and the host says it is a good store cell.  In cheap
//! mode the first candidate ends the group; in accurate mode the scan keeps
//! going until a randomly sized prefix (0.5%–1.8% of the group's cells) has
//! been looked at, so the result is closer to the true nearest cell while
//! large groups stay bounded.
//!
//! # Priority rules
//!
//! Groups below the query's floor are never used.  Above it, an opportunity
//! search only takes storage strictly better than where the item already
//! sits; a before-carry search with a target also takes equal priority, so
//! an item can move to a same-priority group nearer where it is needed.

use rustc_hash::FxHashSet;

use er_core::{AgentId, Cell, GroupKindFilter, ItemView, PlannerRng, PlannerSettings};

use crate::{StorageGroup, StoragePriority, StorageView};

/// Fraction range of a group's cells sampled in accurate mode.
const ACCURATE_SAMPLE: std::ops::Range<f32> = 0.005..0.018;

/// Which group-kind filter a search applies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchStyle {
    /// Detour-to-storage while heading elsewhere.
    Opportunity,
    /// Fetch-from-storage before a carry task.
    BeforeCarry,
}

/// Inputs of one storage search.
#[derive(Copy, Clone, Debug)]
pub struct CellQuery<'a> {
    pub item:             &'a ItemView,
    pub agent:            AgentId,
    pub agent_pos:        Cell,
    /// Distance reference; the first present of primary, secondary, item
    /// position, agent position is used.  Only a before-carry search with a
    /// target admits equal-priority storage.
    pub primary_target:   Option<Cell>,
    pub secondary_target: Option<Cell>,
    /// Groups below this priority are never used.
    pub priority_floor:   StoragePriority,
    pub style:            SearchStyle,
    pub need_accurate:    bool,
}

impl<'a> CellQuery<'a> {
    /// An opportunity search: strictly better storage only, with or without
    /// a target.
    pub fn opportunity(item: &'a ItemView, agent: AgentId, agent_pos: Cell) -> Self {
        Self {
            item,
            agent,
            agent_pos,
            primary_target:   None,
            secondary_target: None,
            priority_floor:   StoragePriority::Unstored,
            style:            SearchStyle::Opportunity,
            need_accurate:    false,
        }
    }

    pub fn with_target(mut self, target: Cell) -> Self {
        self.primary_target = Some(target);
        self
    }

    /// Fallback distance reference for host searches that have one.  The
    /// planner's own searches always know their primary target.
    pub fn with_secondary(mut self, target: Cell) -> Self {
        self.secondary_target = Some(target);
        self
    }

    pub fn with_floor(mut self, floor: StoragePriority) -> Self {
        self.priority_floor = floor;
        self
    }

    pub fn with_style(mut self, style: SearchStyle) -> Self {
        self.style = style;
        self
    }

    /// Sample past the first acceptable cell.  Used where one resolution is
    /// committed without a retry: before-carry plans and the host fallback.
    pub fn accurate(mut self) -> Self {
        self.need_accurate = true;
        self
    }

    /// Equal-priority storage is acceptable.
    #[inline]
    pub fn admits_equal(&self) -> bool {
        self.style == SearchStyle::BeforeCarry
            && (self.primary_target.is_some() || self.secondary_target.is_some())
    }

    #[inline]
    fn reference(&self) -> Cell {
        self.primary_target
            .or(self.secondary_target)
            .or(self.item.position())
            .unwrap_or(self.agent_pos)
    }
}

/// Finds the best acceptable storage cell for an item.
#[derive(Clone, Debug)]
pub struct StorageCellFinder {
    opportunity_filter:  GroupKindFilter,
    before_carry_filter: GroupKindFilter,
    seed:                u64,
}

impl StorageCellFinder {
    pub fn new(opportunity_filter: GroupKindFilter, before_carry_filter: GroupKindFilter, seed: u64) -> Self {
        Self { opportunity_filter, before_carry_filter, seed }
    }

    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self::new(
            settings.opportunity_filter.clone(),
            settings.before_carry_filter.clone(),
            settings.seed,
        )
    }

    /// Is `group` usable under the query's style?
    ///
    /// Before-carry searches must also pass the opportunity filter for groups
    /// at the item's current priority: a same-priority group the agent would
    /// not detour to is not worth delivering to either.
    fn group_allowed(&self, group: &StorageGroup, style: SearchStyle, current: StoragePriority) -> bool {
        match style {
            SearchStyle::Opportunity => group.kind.allowed_by(&self.opportunity_filter),
            SearchStyle::BeforeCarry => {
                group.kind.allowed_by(&self.before_carry_filter)
                    && (group.priority != current || group.kind.allowed_by(&self.opportunity_filter))
            }
        }
    }

    /// Best acceptable cell for `query.item`, or `None`.
    ///
    /// Cells in `excluded` are skipped; the returned cell is added to it so a
    /// later search in the same pass cannot hand it out again.
    pub fn find_closest_acceptable_cell<S: StorageView + ?Sized>(
        &self,
        storage:  &S,
        query:    &CellQuery<'_>,
        excluded: Option<&mut FxHashSet<Cell>>,
    ) -> Option<Cell> {
        let current     = storage.current_priority_of(query.item);
        let admit_equal = query.admits_equal();
        let reference   = query.reference();

        let mut rng = query.need_accurate.then(|| PlannerRng::for_item(self.seed, query.item.id));

        let mut best: Option<Cell> = None;
        let mut best_dist = i64::MAX;
        let mut found_priority = StoragePriority::Unstored;

        for group in storage.groups_by_priority() {
            let priority = group.priority;
            if priority < query.priority_floor {
                break;
            }
            if !admit_equal && priority <= current {
                break;
            }
            if best.is_some() && priority < found_priority {
                break;
            }
            if !group.accepts(query.item.kind) || !self.group_allowed(group, query.style, current) {
                continue;
            }

            let sample = rng.as_mut().map_or(0, |r| r.sample_len(group.cells.len(), ACCURATE_SAMPLE));

            for (i, &cell) in group.cells.iter().enumerate() {
                if excluded.as_deref().is_some_and(|set| set.contains(&cell)) {
                    continue;
                }
                let dist = reference.distance_sq(cell);
                if dist > best_dist {
                    continue;
                }
                if !storage.is_good_store_cell(cell, query.agent, query.item) {
                    continue;
                }
                best = Some(cell);
                best_dist = dist;
                found_priority = priority;
                if i >= sample {
                    break;
                }
            }
        }

        match best {
            Some(cell) => {
                if let Some(set) = excluded {
                    set.insert(cell);
                }
                tracing::trace!(item = %query.item.id, %cell, priority = %found_priority, "store cell found");
                Some(cell)
            }
            None => {
                tracing::trace!(item = %query.item.id, floor = %query.priority_floor, "no store cell");
                None
            }
        }
    }
}
