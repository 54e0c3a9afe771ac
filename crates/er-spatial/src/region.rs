//! Bounded region reachability.
//!
//! The cheap alternative to a full path cost: the grid is cut into square
//! regions, two side-by-side regions are linked when at least one pair of
//! passable cells straddles their shared border, and a breadth-first search
//! over that region graph answers "can `to` be reached from `from` within
//! `max_regions` regions?".  Cells inside one region are assumed mutually
//! reachable, which is the usual navmesh approximation.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use er_core::Cell;

use crate::PassGrid;

/// Pluggable reachability oracle.
pub trait Reachability {
    /// `true` if `to` is reachable from `from` while visiting at most
    /// `max_regions` regions.
    fn reachable_within(&self, grid: &PassGrid, from: Cell, to: Cell, max_regions: u32) -> bool;
}

/// Breadth-first search over fixed-size square regions.
#[derive(Copy, Clone, Debug)]
pub struct RegionBfs {
    size: i32,
}

impl Default for RegionBfs {
    fn default() -> Self {
        Self::new(12)
    }
}

type RegionKey = (i32, i32);

impl RegionBfs {
    /// Regions of `size × size` cells (clamped to at least 1).
    pub fn new(size: i32) -> Self {
        Self { size: size.max(1) }
    }

    #[inline]
    pub fn region_of(&self, c: Cell) -> RegionKey {
        (c.x.div_euclid(self.size), c.z.div_euclid(self.size))
    }

    /// `true` if any passable cell of `a` borders a passable cell of `b`.
    /// `a` and `b` must be orthogonal neighbours.
    fn linked(&self, grid: &PassGrid, a: RegionKey, b: RegionKey) -> bool {
        let (dx, dz) = (b.0 - a.0, b.1 - a.1);
        for i in 0..self.size {
            let (inner, outer) = if dx != 0 {
                let x = if dx > 0 { (a.0 + 1) * self.size - 1 } else { a.0 * self.size };
                let z = a.1 * self.size + i;
                (Cell::new(x, z), Cell::new(x + dx, z))
            } else {
                let z = if dz > 0 { (a.1 + 1) * self.size - 1 } else { a.1 * self.size };
                let x = a.0 * self.size + i;
                (Cell::new(x, z), Cell::new(x, z + dz))
            };
            if grid.passable(inner) && grid.passable(outer) {
                return true;
            }
        }
        false
    }
}

impl Reachability for RegionBfs {
    fn reachable_within(&self, grid: &PassGrid, from: Cell, to: Cell, max_regions: u32) -> bool {
        if !grid.passable(from) || !grid.passable(to) {
            return false;
        }
        let start = self.region_of(from);
        let goal  = self.region_of(to);
        if start == goal {
            return true;
        }

        let mut seen: FxHashSet<RegionKey> = FxHashSet::default();
        let mut queue: VecDeque<RegionKey> = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        let mut looked = 0u32;

        while let Some(region) = queue.pop_front() {
            looked += 1;
            if looked > max_regions {
                return false;
            }
            for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let next = (region.0 + dx, region.1 + dz);
                if seen.contains(&next) || !self.linked(grid, region, next) {
                    continue;
                }
                if next == goal {
                    return true;
                }
                seen.insert(next);
                queue.push_back(next);
            }
        }
        false
    }
}
