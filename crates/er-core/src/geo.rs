//! Grid coordinate type and distance helpers.
//!
//! The host map is a flat grid of integer cells.  Distances are straight-line
//! (Euclidean) in cell units; squared distances are exact integers and are
//! what the cheap range pre-filters compare.

use std::fmt;

/// A cell on the host map.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Exact squared distance.
    #[inline]
    pub fn distance_sq(self, other: Cell) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dz * dz
    }

    /// Euclidean distance in cells.
    #[inline]
    pub fn distance(self, other: Cell) -> f32 {
        (self.distance_sq(other) as f32).sqrt()
    }

    /// The four orthogonal neighbours (may be off-map; callers bounds-check).
    pub fn neighbors4(self) -> [Cell; 4] {
        [
            Cell::new(self.x + 1, self.z),
            Cell::new(self.x - 1, self.z),
            Cell::new(self.x, self.z + 1),
            Cell::new(self.x, self.z - 1),
        ]
    }

    /// `[x, z]` as floats, the point form used by the R-tree indexes.
    #[inline]
    pub fn as_point(self) -> [f32; 2] {
        [self.x as f32, self.z as f32]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
