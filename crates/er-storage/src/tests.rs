//! Unit tests for er-storage.

#[cfg(test)]
mod helpers {
    use er_core::{AgentId, Cell, Holding, ItemId, ItemKind, ItemView};

    pub const AGENT: AgentId = AgentId(0);
    pub const STONE: ItemKind = ItemKind(1);
    pub const WOOD: ItemKind = ItemKind(2);

    pub fn c(x: i32, z: i32) -> Cell {
        Cell::new(x, z)
    }

    pub fn ground(id: u32, kind: ItemKind, at: Cell) -> ItemView {
        ItemView {
            id:          ItemId(id),
            kind,
            holding:     Holding::Ground(at),
            stack_count: 10,
            unit_mass:   1.0,
        }
    }
}

// ── Groups ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod group {
    use er_core::GroupKindFilter;

    use super::helpers::{STONE, WOOD};
    use crate::{Acceptance, GroupKind, StoragePriority};

    #[test]
    fn priority_order() {
        assert!(StoragePriority::Unstored < StoragePriority::Low);
        assert!(StoragePriority::Important < StoragePriority::Critical);
        assert_eq!(StoragePriority::Preferred.to_string(), "preferred");
    }

    #[test]
    fn acceptance_variants() {
        assert!(Acceptance::All.accepts(STONE));
        assert!(Acceptance::only([STONE]).accepts(STONE));
        assert!(!Acceptance::only([STONE]).accepts(WOOD));
        assert!(!Acceptance::except([STONE]).accepts(STONE));
        assert!(Acceptance::except([STONE]).accepts(WOOD));
    }

    #[test]
    fn kind_filtering() {
        let no_shelves = GroupKindFilter {
            stockpiles:       true,
            buildings:        true,
            denied_buildings: vec!["Shelf".into()],
        };
        assert!(GroupKind::Stockpile.allowed_by(&no_shelves));
        assert!(!GroupKind::Building { def: "Shelf".into() }.allowed_by(&no_shelves));
        assert!(GroupKind::Building { def: "Crate".into() }.allowed_by(&no_shelves));
    }
}

// ── StorageMap ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod map {
    use super::helpers::{c, ground, AGENT, STONE, WOOD};
    use crate::{StorageError, StorageMapBuilder, StoragePriority, StorageView};
    use er_core::AgentId;

    #[test]
    fn groups_sorted_by_descending_priority() {
        let mut b = StorageMapBuilder::new();
        let low  = b.add_stockpile("low", StoragePriority::Low, vec![c(0, 0)]);
        let crit = b.add_stockpile("crit", StoragePriority::Critical, vec![c(1, 0)]);
        let norm = b.add_stockpile("norm", StoragePriority::Normal, vec![c(2, 0)]);
        let map = b.build().unwrap();
        let order: Vec<_> = map.groups_by_priority().iter().map(|g| g.id).collect();
        assert_eq!(order, vec![crit, norm, low]);
        assert_eq!(map.group(low).unwrap().label, "low");
    }

    #[test]
    fn group_at_uses_index() {
        let mut b = StorageMapBuilder::new();
        let g = b.add_stockpile("yard", StoragePriority::Normal, StorageMapBuilder::rect(2, 2, 4, 3));
        let map = b.build().unwrap();
        assert_eq!(map.group_at(c(3, 3)).map(|g| g.id), Some(g));
        assert!(map.group_at(c(5, 3)).is_none());
    }

    #[test]
    fn duplicate_cell_rejected() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("a", StoragePriority::Normal, vec![c(0, 0)]);
        b.add_stockpile("b", StoragePriority::Low, vec![c(0, 0)]);
        assert!(matches!(b.build(), Err(StorageError::DuplicateCell { .. })));
    }

    #[test]
    fn empty_group_rejected() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("nothing", StoragePriority::Normal, vec![]);
        assert!(matches!(b.build(), Err(StorageError::EmptyGroup(_))));
    }

    #[test]
    fn current_priority_of_stored_item() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("yard", StoragePriority::Preferred, vec![c(0, 0)]);
        let map = b.build().unwrap();
        assert_eq!(map.current_priority_of(&ground(1, STONE, c(0, 0))), StoragePriority::Preferred);
        assert_eq!(map.current_priority_of(&ground(1, STONE, c(9, 9))), StoragePriority::Unstored);
    }

    #[test]
    fn occupancy_and_stack_limits() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("yard", StoragePriority::Normal, vec![c(0, 0)]);
        b.stack_limit(STONE, 20);
        let mut map = b.build().unwrap();

        map.place(c(0, 0), STONE, 15).unwrap();
        assert_eq!(map.room_for(c(0, 0), STONE), 5);
        assert_eq!(map.room_for(c(0, 0), WOOD), 0);
        assert!(matches!(map.place(c(0, 0), STONE, 6), Err(StorageError::Overfull { .. })));
        assert!(matches!(map.place(c(0, 0), WOOD, 1), Err(StorageError::KindMismatch { .. })));
        assert!(matches!(map.place(c(3, 3), STONE, 1), Err(StorageError::NotStorage(_))));

        map.place(c(0, 0), STONE, 5).unwrap();
        assert!(!map.is_good_store_cell(c(0, 0), AGENT, &ground(1, STONE, c(5, 5))));
        assert_eq!(map.take(c(0, 0), 100), 20);
        assert!(map.contents(c(0, 0)).is_none());
        assert!(map.is_good_store_cell(c(0, 0), AGENT, &ground(1, WOOD, c(5, 5))));
    }

    #[test]
    fn reservations_block_other_agents() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("yard", StoragePriority::Normal, vec![c(0, 0), c(1, 0)]);
        let mut map = b.build().unwrap();
        let item = ground(1, STONE, c(5, 5));

        map.reserve(c(0, 0), AgentId(1)).unwrap();
        assert!(!map.is_good_store_cell(c(0, 0), AGENT, &item));
        assert!(map.is_good_store_cell(c(0, 0), AgentId(1), &item));
        assert!(matches!(map.reserve(c(0, 0), AGENT), Err(StorageError::Reserved { .. })));

        map.reserve(c(1, 0), AgentId(1)).unwrap();
        map.release_all(AgentId(1));
        assert!(map.reserved_by(c(0, 0)).is_none());
        assert!(map.reserved_by(c(1, 0)).is_none());
    }
}

// ── StorageCellFinder ─────────────────────────────────────────────────────────

#[cfg(test)]
mod finder {
    use rustc_hash::FxHashSet;

    use er_core::{GroupKindFilter, PlannerSettings};

    use super::helpers::{c, ground, AGENT, STONE, WOOD};
    use crate::{
        Acceptance, CellQuery, GroupKind, SearchStyle, StorageCellFinder, StorageMap,
        StorageMapBuilder, StoragePriority,
    };

    fn finder() -> StorageCellFinder {
        StorageCellFinder::from_settings(&PlannerSettings::default())
    }

    /// Normal stockpile at x = 10..=12, z = 2; preferred single cell at (30, 0).
    fn two_tier_map() -> StorageMap {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("normal", StoragePriority::Normal, StorageMapBuilder::rect(10, 2, 12, 2));
        b.add_stockpile("preferred", StoragePriority::Preferred, vec![c(30, 0)]);
        b.build().unwrap()
    }

    #[test]
    fn higher_priority_wins_over_distance() {
        let map = two_tier_map();
        let item = ground(1, STONE, c(10, 1));
        let q = CellQuery::opportunity(&item, AGENT, c(0, 0));
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), Some(c(30, 0)));
    }

    #[test]
    fn falls_through_to_lower_group_when_better_is_unacceptable() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("normal", StoragePriority::Normal, vec![c(10, 2)]);
        b.add_group("wood only", StoragePriority::Critical, GroupKind::Stockpile,
                    Acceptance::only([WOOD]), vec![c(3, 3)]);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(10, 1));
        let q = CellQuery::opportunity(&item, AGENT, c(0, 0));
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), Some(c(10, 2)));
    }

    #[test]
    fn idempotent_without_reservation() {
        let map = two_tier_map();
        let item = ground(1, STONE, c(10, 1));
        let q = CellQuery::opportunity(&item, AGENT, c(0, 0)).accurate();
        let f = finder();
        let first = f.find_closest_acceptable_cell(&map, &q, None);
        let second = f.find_closest_acceptable_cell(&map, &q, None);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn opportunity_requires_strictly_better_priority() {
        // Item already sits in a Normal stockpile; another Normal cell exists.
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("here", StoragePriority::Normal, vec![c(0, 0)]);
        b.add_stockpile("there", StoragePriority::Normal, vec![c(5, 0)]);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(0, 0));
        let q = CellQuery::opportunity(&item, AGENT, c(2, 2)).with_floor(StoragePriority::Normal);
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), None);
    }

    #[test]
    fn target_admits_equal_priority() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("here", StoragePriority::Normal, vec![c(0, 0)]);
        b.add_stockpile("there", StoragePriority::Normal, vec![c(5, 0)]);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(0, 0));
        let q = CellQuery::opportunity(&item, AGENT, c(2, 2))
            .with_floor(StoragePriority::Normal)
            .with_target(c(6, 0))
            .with_style(SearchStyle::BeforeCarry);
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), Some(c(5, 0)));
    }

    #[test]
    fn opportunity_target_keeps_strictly_better_rule() {
        // A target only moves the distance reference for opportunity searches.
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("here", StoragePriority::Normal, vec![c(10, 1)]);
        b.add_stockpile("there", StoragePriority::Normal, vec![c(12, 1)]);
        b.add_stockpile("better", StoragePriority::Preferred, vec![c(19, 1)]);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(10, 1));
        let q = CellQuery::opportunity(&item, AGENT, c(0, 0))
            .with_floor(StoragePriority::Normal)
            .with_target(c(20, 0));
        assert!(!q.admits_equal());
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), Some(c(19, 1)));

        let mut b = StorageMapBuilder::new();
        b.add_stockpile("here", StoragePriority::Normal, vec![c(10, 1)]);
        b.add_stockpile("there", StoragePriority::Normal, vec![c(12, 1)]);
        let map = b.build().unwrap();
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), None);
        assert!(q.with_style(SearchStyle::BeforeCarry).admits_equal());
    }

    #[test]
    fn floor_excludes_lower_groups_even_with_target() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("low", StoragePriority::Low, vec![c(5, 0)]);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(0, 0));
        let q = CellQuery::opportunity(&item, AGENT, c(0, 0))
            .with_floor(StoragePriority::Normal)
            .with_target(c(6, 0));
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), None);
    }

    #[test]
    fn reference_point_prefers_primary_target() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("west", StoragePriority::Normal, vec![c(0, 0)]);
        b.add_stockpile("east", StoragePriority::Normal, vec![c(20, 0)]);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(1, 5));
        let f = finder();

        let untargeted = CellQuery::opportunity(&item, AGENT, c(1, 5));
        assert_eq!(f.find_closest_acceptable_cell(&map, &untargeted, None), Some(c(0, 0)));

        let targeted = untargeted.with_target(c(19, 0)).with_secondary(c(0, 1));
        assert_eq!(f.find_closest_acceptable_cell(&map, &targeted, None), Some(c(20, 0)));

        let secondary_only = untargeted.with_secondary(c(19, 1));
        assert_eq!(f.find_closest_acceptable_cell(&map, &secondary_only, None), Some(c(20, 0)));
    }

    #[test]
    fn exclusion_set_prevents_double_booking() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("yard", StoragePriority::Normal, vec![c(10, 0), c(11, 0)]);
        let map = b.build().unwrap();
        let a = ground(1, STONE, c(9, 0));
        let b2 = ground(2, STONE, c(9, 1));
        let f = finder();
        let mut excluded = FxHashSet::default();

        let first = f.find_closest_acceptable_cell(
            &map, &CellQuery::opportunity(&a, AGENT, c(0, 0)), Some(&mut excluded));
        let second = f.find_closest_acceptable_cell(
            &map, &CellQuery::opportunity(&b2, AGENT, c(0, 0)), Some(&mut excluded));
        let third = f.find_closest_acceptable_cell(
            &map, &CellQuery::opportunity(&ground(3, STONE, c(9, 2)), AGENT, c(0, 0)), Some(&mut excluded));

        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
        assert_eq!(third, None);
        assert_eq!(excluded.len(), 2);
    }

    #[test]
    fn opportunity_filter_blocks_buildings() {
        let mut b = StorageMapBuilder::new();
        b.add_group("shelf", StoragePriority::Normal, GroupKind::Building { def: "Shelf".into() },
                    Acceptance::All, vec![c(4, 0)]);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(0, 0));
        let f = StorageCellFinder::new(
            GroupKindFilter { buildings: false, ..GroupKindFilter::default() },
            GroupKindFilter::default(),
            0,
        );
        let q = CellQuery::opportunity(&item, AGENT, c(0, 0));
        assert_eq!(f.find_closest_acceptable_cell(&map, &q, None), None);
    }

    #[test]
    fn before_carry_reuses_opportunity_filter_at_equal_priority() {
        // Item is stored at Normal; the only other Normal group is a shelf the
        // opportunity filter denies.
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("here", StoragePriority::Normal, vec![c(0, 0)]);
        b.add_group("shelf", StoragePriority::Normal, GroupKind::Building { def: "Shelf".into() },
                    Acceptance::All, vec![c(8, 0)]);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(0, 0));
        let deny_shelf = GroupKindFilter {
            denied_buildings: vec!["Shelf".into()],
            ..GroupKindFilter::default()
        };
        let q = CellQuery::opportunity(&item, AGENT, c(0, 0))
            .with_floor(StoragePriority::Normal)
            .with_target(c(9, 0))
            .with_style(SearchStyle::BeforeCarry);

        let strict = StorageCellFinder::new(deny_shelf, GroupKindFilter::default(), 0);
        // Falls back to the item's own stockpile cell, which is still good.
        assert_eq!(strict.find_closest_acceptable_cell(&map, &q, None), Some(c(0, 0)));

        let lenient = finder();
        assert_eq!(lenient.find_closest_acceptable_cell(&map, &q, None), Some(c(8, 0)));
    }

    #[test]
    fn cheap_mode_takes_first_good_cell_in_list_order() {
        // List order puts the far cell first; cheap mode stops there.
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("yard", StoragePriority::Normal, vec![c(9, 0), c(1, 0)]);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(0, 0));
        let q = CellQuery::opportunity(&item, AGENT, c(0, 0));
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), Some(c(9, 0)));
    }

    #[test]
    fn accurate_mode_scans_sampled_prefix() {
        // 400 cells: the sampled prefix always reaches past the first cell,
        // so the closer second cell replaces it.
        let mut cells = vec![c(399, 0)];
        cells.extend((1..400).map(|x| c(x - 1, 1)));
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("row", StoragePriority::Normal, cells);
        let map = b.build().unwrap();
        let item = ground(1, STONE, c(0, 5));
        let q = CellQuery::opportunity(&item, AGENT, c(0, 5)).accurate();
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), Some(c(0, 1)));
    }

    #[test]
    fn held_item_uses_agent_position() {
        let mut b = StorageMapBuilder::new();
        b.add_stockpile("west", StoragePriority::Normal, vec![c(0, 0)]);
        b.add_stockpile("east", StoragePriority::Normal, vec![c(20, 0)]);
        let map = b.build().unwrap();
        let mut item = ground(1, STONE, c(0, 0));
        item.holding = er_core::Holding::Carried(AGENT);
        let q = CellQuery::opportunity(&item, AGENT, c(19, 0));
        assert_eq!(finder().find_closest_acceptable_cell(&map, &q, None), Some(c(20, 0)));
    }
}
