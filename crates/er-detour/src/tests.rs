//! Unit tests for er-detour.

#[cfg(test)]
mod helpers {
    use er_core::{Cell, ItemId, ItemKind};

    use crate::{Detour, DetourKind, Haul, TripBudget};

    pub const STONE: ItemKind = ItemKind(1);
    pub const WOOD:  ItemKind = ItemKind(2);
    pub const CLOTH: ItemKind = ItemKind(3);

    pub fn c(x: i32, z: i32) -> Cell {
        Cell::new(x, z)
    }

    pub fn haul(id: u32, kind: ItemKind, item_cell: Cell, store_cell: Cell) -> Haul {
        Haul { item: ItemId(id), kind, item_cell, store_cell }
    }

    pub fn default_budget() -> TripBudget {
        TripBudget { max_total_trip_pct: 1.7, max_new_legs_pct: 1.0 }
    }

    pub fn loose_budget() -> TripBudget {
        TripBudget { max_total_trip_pct: 100.0, max_new_legs_pct: 100.0 }
    }

    /// Opportunity detour from (0, 0) toward a job at (20, 0).
    pub fn opportunity() -> Detour {
        let mut d = Detour::new();
        d.activate(DetourKind::Opportunity { job_target: c(20, 0) }, c(0, 0));
        d
    }
}

// ── DetourKind ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod kind {
    use super::helpers::c;
    use crate::DetourKind;

    #[test]
    fn inventory_batch_counterparts() {
        let job = DetourKind::Opportunity { job_target: c(1, 1) };
        assert_eq!(job.with_inventory_batch(), DetourKind::InventoryBatchOpportunity { job_target: c(1, 1) });
        let carry = DetourKind::BeforeCarry { carry_target: c(2, 2) };
        assert_eq!(carry.with_inventory_batch(), DetourKind::InventoryBatchBeforeCarry { carry_target: c(2, 2) });
        assert_eq!(DetourKind::Inactive.with_inventory_batch(), DetourKind::InventoryBatch);
        assert_eq!(DetourKind::InventoryBatch.with_inventory_batch(), DetourKind::InventoryBatch);
    }

    #[test]
    fn classification() {
        let ib_opp = DetourKind::InventoryBatchOpportunity { job_target: c(0, 0) };
        assert!(ib_opp.is_opportunity() && ib_opp.is_inventory_batch() && ib_opp.is_chain_capable());
        let bc = DetourKind::BeforeCarry { carry_target: c(3, 3) };
        assert!(bc.is_before_carry() && !bc.is_chain_capable());
        assert_eq!(bc.destination(), Some(c(3, 3)));
        assert!(!DetourKind::Inactive.is_active());
        assert_eq!(DetourKind::InventoryBatch.destination(), None);
        assert_eq!(ib_opp.to_string(), "inventory-batch-opportunity");
    }
}

// ── Detour lifecycle ──────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use er_core::Tick;

    use super::helpers::{c, haul, loose_budget, opportunity, STONE};
    use crate::{Detour, DetourKind};

    #[test]
    fn activation_fixes_orig_trip() {
        let d = opportunity();
        assert!(d.is_active());
        assert!((d.orig_trip - 20.0).abs() < 1e-6);
        assert!(d.hauls().is_empty());
    }

    #[test]
    fn reactivation_clears_chain() {
        let mut d = opportunity();
        d.track_if_opportune(haul(1, STONE, c(5, 0), c(6, 0)), None, &loose_budget()).unwrap();
        d.activate(DetourKind::Opportunity { job_target: c(0, 9) }, c(0, 0));
        assert!(d.hauls().is_empty());
        assert!(d.type_cells().is_empty());
        assert!((d.orig_trip - 9.0).abs() < 1e-6);
    }

    #[test]
    fn deactivating_opportunity_stamps_debounce() {
        let mut d = opportunity();
        d.track_if_opportune(haul(1, STONE, c(5, 0), c(6, 0)), None, &loose_budget()).unwrap();
        d.deactivate(Tick(10));
        assert_eq!(d.kind, DetourKind::Inactive);
        assert!(d.hauls().is_empty() && d.type_cells().is_empty());
        assert_eq!(d.opportunity_done_at, Some(Tick(10)));
        assert!(d.in_debounce(Tick(14), 5));
        assert!(!d.in_debounce(Tick(15), 5));
    }

    #[test]
    fn deactivating_before_carry_does_not_stamp() {
        let mut d = Detour::new();
        d.activate(DetourKind::BeforeCarry { carry_target: c(4, 0) }, c(0, 0));
        d.deactivate(Tick(3));
        assert_eq!(d.opportunity_done_at, None);
        assert!(!d.in_debounce(Tick(3), 5));
    }
}

// ── TrackIfOpportune ──────────────────────────────────────────────────────────

#[cfg(test)]
mod track {
    use er_core::ItemId;

    use super::helpers::{c, default_budget, haul, loose_budget, opportunity, STONE, WOOD};
    use crate::detour::Undo;
    use crate::{Detour, DetourError, DetourKind, TrackOutcome, TripBudget};

    #[test]
    fn single_haul_within_default_budget() {
        let mut d = opportunity();
        let out = d.track_if_opportune(haul(1, STONE, c(10, 1), c(12, 1)), None, &default_budget()).unwrap();
        let TrackOutcome::Accepted { legs } = out else { panic!("expected acceptance, got {out:?}") };
        assert!((legs.start_to_last_item - 101f32.sqrt()).abs() < 1e-4);
        assert!((legs.last_item_to_first_store - 2.0).abs() < 1e-4);
        assert_eq!(legs.first_store_to_last_store, 0.0);
        assert!((legs.last_store_to_target - 65f32.sqrt()).abs() < 1e-4);
        assert!(legs.total() <= 34.0 && legs.new_legs() <= 20.0);
        assert_eq!(d.type_cell(STONE), Some(c(12, 1)));
    }

    #[test]
    fn second_haul_over_new_legs_is_rejected() {
        let mut d = opportunity();
        let a = haul(1, STONE, c(10, 1), c(12, 1));
        assert!(d.track_if_opportune(a, None, &default_budget()).unwrap().is_accepted());

        let b = haul(2, WOOD, c(10, -8), c(11, -8));
        let out = d.track_if_opportune(b, None, &default_budget()).unwrap();
        let TrackOutcome::Rejected { legs } = out else { panic!("expected rejection, got {out:?}") };
        assert!(legs.new_legs() > 20.0);
        assert_eq!(d.hauls(), &[a]);
        assert_eq!(d.type_cell(WOOD), None);
    }

    #[test]
    fn rejection_restores_chain_exactly() {
        let mut d = opportunity();
        let budget = TripBudget { max_total_trip_pct: 1.7, max_new_legs_pct: 1.5 };
        assert!(d.track_if_opportune(haul(1, STONE, c(10, 1), c(12, 1)), None, &budget).unwrap().is_accepted());
        assert!(d.track_if_opportune(haul(3, STONE, c(14, 0), c(15, 0)), None, &budget).unwrap().is_accepted());

        let hauls_before = d.hauls().to_vec();
        let cells_before = d.type_cells().clone();

        let out = d.track_if_opportune(haul(2, WOOD, c(10, -8), c(11, -8)), None, &budget).unwrap();
        assert!(!out.is_accepted());
        assert_eq!(d.hauls(), hauls_before.as_slice());
        assert_eq!(d.type_cells(), &cells_before);
    }

    #[test]
    fn rejected_replacement_restores_previous_entry() {
        let mut d = opportunity();
        let a = haul(1, STONE, c(10, 1), c(12, 1));
        d.track_if_opportune(a, None, &default_budget()).unwrap();

        let far = haul(1, STONE, c(10, 1), c(40, 40));
        assert!(!d.track_if_opportune(far, None, &default_budget()).unwrap().is_accepted());
        assert_eq!(d.hauls(), &[a]);
        assert_eq!(d.type_cell(STONE), Some(c(12, 1)));
    }

    #[test]
    fn repeat_notification_replaces() {
        let mut d = opportunity();
        d.track_if_opportune(haul(1, STONE, c(5, 0), c(6, 0)), None, &loose_budget()).unwrap();
        d.track_if_opportune(haul(1, STONE, c(5, 0), c(7, 0)), None, &loose_budget()).unwrap();
        assert_eq!(d.hauls().len(), 1);
        assert_eq!(d.hauls()[0].store_cell, c(7, 0));
        assert_eq!(d.type_cell(STONE), Some(c(7, 0)));
    }

    #[test]
    fn carried_item_is_prepended() {
        let mut d = opportunity();
        let a = haul(1, STONE, c(5, 0), c(6, 0));
        let b = haul(2, WOOD, c(8, 0), c(9, 0));
        d.track_if_opportune(a, None, &loose_budget()).unwrap();
        d.track_if_opportune(b, Some(ItemId(2)), &loose_budget()).unwrap();
        assert_eq!(d.hauls(), &[b, a]);
    }

    #[test]
    fn non_chain_kinds_refuse() {
        let mut d = Detour::new();
        d.activate(DetourKind::BeforeCarry { carry_target: c(9, 9) }, c(0, 0));
        let err = d.track_if_opportune(haul(1, STONE, c(1, 1), c(2, 2)), None, &loose_budget());
        assert!(matches!(err, Err(DetourError::NotChainCapable(_))));
        assert!(d.hauls().is_empty());
    }

    #[test]
    fn rollback_mismatch_leaves_hauls_untouched() {
        let mut d = opportunity();
        let a = haul(1, STONE, c(5, 0), c(6, 0));
        d.track_if_opportune(a, None, &loose_budget()).unwrap();
        let err = d.rollback(Undo::InsertedBack, ItemId(99));
        assert_eq!(err, Err(DetourError::RollbackMismatch { expected: ItemId(99), found: Some(ItemId(1)) }));
        assert_eq!(d.hauls(), &[a]);
    }
}

// ── Unload order ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod unload {
    use er_core::{Holding, ItemId, ItemView, AgentId};

    use super::helpers::{c, haul, loose_budget, opportunity, CLOTH, STONE, WOOD};
    use crate::Detour;

    fn chain(stores: &[(i32, i32)]) -> Detour {
        let mut d = opportunity();
        for (i, &(x, z)) in stores.iter().enumerate() {
            let id = i as u32 + 1;
            d.track_if_opportune(haul(id, STONE, c(x, z + 1), c(x, z)), None, &loose_budget()).unwrap();
        }
        d
    }

    #[test]
    fn greedy_nearest_neighbour() {
        let d = chain(&[(0, 0), (10, 0), (1, 0), (11, 0)]);
        assert_eq!(d.unload_order(None), vec![0, 2, 1, 3]);
    }

    #[test]
    fn starts_at_carried_entry() {
        let d = chain(&[(0, 0), (10, 0), (1, 0), (11, 0)]);
        assert_eq!(d.unload_order(Some(ItemId(2))), vec![1, 3, 2, 0]);
    }

    #[test]
    fn ties_go_to_list_order() {
        let d = chain(&[(5, 0), (4, 0), (6, 0)]);
        assert_eq!(d.unload_order(None), vec![0, 1, 2]);
    }

    #[test]
    fn empty_chain() {
        let d = opportunity();
        assert!(d.unload_order(None).is_empty());
        assert_eq!(d.trip_legs(None).total(), 0.0);
    }

    #[test]
    fn next_unload_prefers_nearest_type_cell() {
        let mut d = opportunity();
        d.record_type_cell(STONE, c(10, 0));
        d.record_type_cell(WOOD, c(2, 0));
        let agent = AgentId(0);
        let item = |id, kind| ItemView {
            id: ItemId(id),
            kind,
            holding: Holding::Inventory(agent),
            stack_count: 1,
            unit_mass: 1.0,
        };
        let inventory = [item(1, CLOTH), item(2, STONE), item(3, WOOD)];
        assert_eq!(d.next_unload(&inventory, c(0, 0)), Some(ItemId(3)));
        assert_eq!(d.next_unload(&inventory, c(11, 0)), Some(ItemId(2)));
        assert_eq!(d.next_unload(&inventory[..1], c(0, 0)), Some(ItemId(1)));
        assert_eq!(d.next_unload(&[], c(0, 0)), None);
    }
}

// ── DetourTable ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod table {
    use er_core::{AgentId, Tick};

    use super::helpers::c;
    use crate::{DetourKind, DetourTable};

    #[test]
    fn lazily_created_and_pruned() {
        let mut t = DetourTable::new();
        assert!(t.is_empty());
        t.get_or_insert(AgentId(1)).activate(DetourKind::Opportunity { job_target: c(9, 0) }, c(0, 0));
        t.get_or_insert(AgentId(2));
        assert_eq!(t.len(), 2);
        assert_eq!(t.active_count(), 1);
        assert!(t.active(AgentId(1)).is_some());
        assert!(t.active(AgentId(2)).is_none());

        assert!(t.deactivate(AgentId(1), Tick(4)));
        assert!(!t.deactivate(AgentId(1), Tick(5)));
        assert_eq!(t.get(AgentId(1)).and_then(|d| d.opportunity_done_at), Some(Tick(4)));

        assert!(t.remove(AgentId(1)).is_some());
        assert!(t.get(AgentId(1)).is_none());
        assert_eq!(t.len(), 1);
    }
}
