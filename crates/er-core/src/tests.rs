//! Unit tests for er-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, ItemId, ItemKind};

    #[test]
    fn index_roundtrip() {
        let id = ItemId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(ItemId::from_index(42), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(ItemKind::INVALID.0, u16::MAX);
        assert_eq!(ItemId::from_index(7), ItemId(7));
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Cell;

    #[test]
    fn distances() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(a.distance_sq(b), 25);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn neighbors_are_orthogonal() {
        let c = Cell::new(5, 5);
        for n in c.neighbors4() {
            assert_eq!(c.distance_sq(n), 1);
        }
    }

    #[test]
    fn display() {
        assert_eq!(Cell::new(-1, 2).to_string(), "(-1, 2)");
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn since_saturates() {
        assert_eq!(Tick(15).since(Tick(10)), 5);
        assert_eq!(Tick(3).since(Tick(10)), 0);
        assert_eq!(Tick(u64::MAX) + 1, Tick(u64::MAX));
    }

    #[test]
    fn within_window_is_exclusive() {
        let done = Tick(10);
        assert!(Tick(10).within(done, 5));
        assert!(Tick(14).within(done, 5));
        assert!(!Tick(15).within(done, 5));
        assert!(!Tick(10).within(done, 0));
    }

    #[test]
    fn clock_advances() {
        let mut clock = SimClock::default();
        assert_eq!(clock.advance(), Tick(1));
        clock.advance();
        assert_eq!(clock.now(), Tick(2));
        assert_eq!(clock.to_string(), "T2");
    }
}

#[cfg(test)]
mod rng {
    use crate::{ItemId, PlannerRng};

    #[test]
    fn same_item_same_sequence() {
        let mut a = PlannerRng::for_item(9, ItemId(3));
        let mut b = PlannerRng::for_item(9, ItemId(3));
        for len in [50, 400, 1_000, 10_000] {
            assert_eq!(a.sample_len(len, 0.005..0.018), b.sample_len(len, 0.005..0.018));
        }
    }

    #[test]
    fn sample_len_stays_in_fraction() {
        let mut r = PlannerRng::for_item(1, ItemId(0));
        for _ in 0..32 {
            let n = r.sample_len(1_000, 0.005..0.018);
            assert!((4..18).contains(&n), "{n}");
        }
        assert_eq!(r.sample_len(10, 0.005..0.018), 0);
    }

    #[test]
    fn different_items_diverge() {
        let mut a = PlannerRng::for_item(9, ItemId(3));
        let mut b = PlannerRng::for_item(9, ItemId(4));
        let xs: Vec<usize> = (0..8).map(|_| a.sample_len(1_000_000, 0.0..1.0)).collect();
        let ys: Vec<usize> = (0..8).map(|_| b.sample_len(1_000_000, 0.0..1.0)).collect();
        assert_ne!(xs, ys);
    }
}

#[cfg(test)]
mod config {
    use std::io::Write;

    use crate::{CoreError, GroupKindFilter, MaxRanges, PathCheck, PlannerSettings};

    #[test]
    fn defaults_are_valid() {
        let s = PlannerSettings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.max_total_trip_pct_orig_trip, 1.7);
        assert_eq!(s.max_new_legs_pct_orig_trip, 1.0);
        assert_eq!(s.heuristic_expand_factor, 2.0);
    }

    #[test]
    fn empty_toml_is_defaults() {
        let s = PlannerSettings::from_toml_str("").unwrap();
        assert_eq!(s, PlannerSettings::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let text = r#"
            path_check = "pathfinding"
            max_new_legs_pct_orig_trip = 1.2

            [opportunity_filter]
            buildings = false
        "#;
        let s = PlannerSettings::from_toml_str(text).unwrap();
        assert_eq!(s.path_check, PathCheck::Pathfinding);
        assert_eq!(s.max_new_legs_pct_orig_trip, 1.2);
        assert!(!s.opportunity_filter.buildings);
        assert!(s.opportunity_filter.stockpiles);
        assert!(s.before_carry_filter.buildings);
    }

    #[test]
    fn rejects_bad_expand_factor() {
        let err = PlannerSettings::from_toml_str("heuristic_expand_factor = 1.0").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn rejects_non_positive_budget() {
        let err = PlannerSettings::from_toml_str("max_total_trip_pct_orig_trip = 0.0").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = PlannerSettings::from_toml_str("enabled = maybe").unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "opportunity_debounce_ticks = 9").unwrap();
        let s = PlannerSettings::load(file.path()).unwrap();
        assert_eq!(s.opportunity_debounce_ticks, 9);
    }

    #[test]
    fn path_check_modes() {
        assert!(PathCheck::Vanilla.range_fail_is_fatal());
        assert!(!PathCheck::Default.range_fail_is_fatal());
        assert!(PathCheck::Pathfinding.uses_path_cost());
        assert!(!PathCheck::Default.uses_path_cost());
    }

    #[test]
    fn kind_filter_denies_named_buildings() {
        let f = GroupKindFilter {
            stockpiles:       false,
            buildings:        true,
            denied_buildings: vec!["Shelf".into()],
        };
        assert!(!f.allows_stockpile());
        assert!(!f.allows_building("Shelf"));
        assert!(f.allows_building("Crate"));
    }

    #[test]
    fn max_ranges_expand_monotonically() {
        let mut r = MaxRanges::from_settings(&PlannerSettings::default());
        let before = r;
        r.expand(2.0);
        assert_eq!(r.expand_count, 1);
        assert_eq!(r.start_to_item, before.start_to_item * 2.0);
        assert_eq!(r.store_to_job_pct_orig_trip, before.store_to_job_pct_orig_trip * 2.0);
        // A factor below one never shrinks the budget.
        let mid = r;
        r.expand(0.5);
        assert_eq!(r.start_to_item, mid.start_to_item);
        assert_eq!(r.expand_count, 2);
    }
}

#[cfg(test)]
mod diag {
    use crate::{AgentId, DiagnosticLimiter, Tick};

    #[test]
    fn repeats_are_muted_within_cooldown() {
        let mut d = DiagnosticLimiter::new(1);
        assert!(d.should_emit(AgentId(0), "k", Tick(5)));
        assert!(!d.should_emit(AgentId(0), "k", Tick(5)));
        assert!(d.should_emit(AgentId(1), "k", Tick(5)));
        assert!(d.should_emit(AgentId(0), "other", Tick(5)));
        assert!(d.should_emit(AgentId(0), "k", Tick(6)));
    }

    #[test]
    fn forget_agent_clears_entries() {
        let mut d = DiagnosticLimiter::new(10);
        d.should_emit(AgentId(0), "k", Tick(0));
        d.should_emit(AgentId(1), "k", Tick(0));
        d.forget_agent(AgentId(0));
        assert_eq!(d.len(), 1);
        assert!(d.should_emit(AgentId(0), "k", Tick(1)));
    }
}

#[cfg(test)]
mod item {
    use crate::{AgentId, Cell, Holding, ItemId, ItemKind, ItemView};

    fn item(holding: Holding) -> ItemView {
        ItemView { id: ItemId(1), kind: ItemKind(2), holding, stack_count: 4, unit_mass: 0.5 }
    }

    #[test]
    fn position_only_on_ground() {
        assert_eq!(item(Holding::Ground(Cell::new(1, 2))).position(), Some(Cell::new(1, 2)));
        assert_eq!(item(Holding::Carried(AgentId(0))).position(), None);
    }

    #[test]
    fn inventory_and_mass() {
        let i = item(Holding::Inventory(AgentId(3)));
        assert!(i.in_inventory_of(AgentId(3)));
        assert!(!i.in_inventory_of(AgentId(4)));
        assert_eq!(i.total_mass(), 2.0);
    }
}
