//! Path-cost oracle trait and default Dijkstra implementation.
//!
//! # Cost units
//!
//! Costs are accumulated in integer milli-cost (`u32`) internally so the heap
//! has a total order, and returned as `f32` cell-cost units.  A straight
//! orthogonal walk over plain floor costs exactly its length in cells.
//!
//! # Unreachable
//!
//! The oracle contract returns `0.0` for "no path".  Callers never ask for
//! the cost between a cell and itself, so a zero result is unambiguous.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use er_core::Cell;

use crate::PassGrid;

/// How step costs are counted.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum TraverseMode {
    /// Honour per-cell move costs.
    #[default]
    Normal,
    /// Every passable cell costs 1; only walls matter.
    IgnoreCosts,
}

// ── Oracle trait ──────────────────────────────────────────────────────────────

/// Pluggable traversal-cost oracle.
///
/// Implement this to route the planner through the host's own pathfinder.
pub trait PathCostOracle {
    /// Traversal cost from `from` to `to`, or `0.0` if unreachable.
    fn path_cost(&self, grid: &PassGrid, from: Cell, to: Cell, mode: TraverseMode) -> f32;
}

// ── DijkstraPathCost ──────────────────────────────────────────────────────────

/// Dijkstra over the 8-connected grid.
///
/// Diagonal steps cost √2 × the destination cell's cost and may not cut the
/// corner of a wall.
pub struct DijkstraPathCost;

const DIAGONAL: f32 = std::f32::consts::SQRT_2;

impl PathCostOracle for DijkstraPathCost {
    fn path_cost(&self, grid: &PassGrid, from: Cell, to: Cell, mode: TraverseMode) -> f32 {
        dijkstra(grid, from, to, mode)
            .map(|milli| milli as f32 / 1000.0)
            .unwrap_or(0.0)
    }
}

#[inline]
fn step_milli(grid: &PassGrid, onto: Cell, diagonal: bool, mode: TraverseMode) -> Option<u32> {
    let base = match mode {
        TraverseMode::Normal      => grid.move_cost(onto)?,
        TraverseMode::IgnoreCosts => {
            grid.move_cost(onto)?;
            1.0
        }
    };
    let scale = if diagonal { DIAGONAL } else { 1.0 };
    Some((base * scale * 1000.0).round() as u32)
}

fn dijkstra(grid: &PassGrid, from: Cell, to: Cell, mode: TraverseMode) -> Option<u32> {
    let start = grid.index_of(from)?;
    let goal  = grid.index_of(to)?;
    if !grid.passable(to) {
        return None;
    }
    if start == goal {
        return None;
    }

    // dist[i] = best known milli-cost to reach cell i.
    let mut dist = vec![u32::MAX; grid.cell_count()];
    dist[start] = 0;

    // Secondary key (cell index) makes tie-breaking deterministic.
    let mut heap: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();
    heap.push(Reverse((0, start)));

    while let Some(Reverse((cost, index))) = heap.pop() {
        if index == goal {
            return Some(cost);
        }
        if cost > dist[index] {
            continue;
        }

        let here = grid.cell_at(index);
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let next = Cell::new(here.x + dx, here.z + dz);
                let diagonal = dx != 0 && dz != 0;
                if diagonal
                    && (!grid.passable(Cell::new(here.x + dx, here.z))
                        || !grid.passable(Cell::new(here.x, here.z + dz)))
                {
                    continue;
                }
                let Some(step) = step_milli(grid, next, diagonal, mode) else {
                    continue;
                };
                let Some(next_index) = grid.index_of(next) else {
                    continue;
                };
                let new_cost = cost.saturating_add(step);
                if new_cost < dist[next_index] {
                    dist[next_index] = new_cost;
                    heap.push(Reverse((new_cost, next_index)));
                }
            }
        }
    }

    None
}
