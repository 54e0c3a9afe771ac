//! Map passability grid and builder.
//!
//! # Data layout
//!
//! Row-major: cell `(x, z)` lives at index `z * width + x`.  A cost of
//! `0.0` marks an impassable cell; any positive value is the cost of
//! stepping onto that cell (1.0 for plain floor).

use er_core::Cell;

use crate::{SpatialError, SpatialResult};

/// Dense cost grid for the host map.
///
/// Do not construct directly; use [`PassGridBuilder`].
#[derive(Clone, Debug)]
pub struct PassGrid {
    width:  u32,
    height: u32,
    cost:   Vec<f32>,
}

impl PassGrid {
    /// An all-floor grid.
    pub fn open(width: u32, height: u32) -> Self {
        PassGridBuilder::new(width, height).build()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cost.len()
    }

    #[inline]
    pub fn in_bounds(&self, c: Cell) -> bool {
        c.x >= 0 && c.z >= 0 && (c.x as u32) < self.width && (c.z as u32) < self.height
    }

    /// Row-major index of an in-bounds cell.
    #[inline]
    pub fn index_of(&self, c: Cell) -> Option<usize> {
        self.in_bounds(c)
            .then(|| c.z as usize * self.width as usize + c.x as usize)
    }

    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        let w = self.width as usize;
        Cell::new((index % w) as i32, (index / w) as i32)
    }

    /// `true` for in-bounds cells that can be walked on.
    #[inline]
    pub fn passable(&self, c: Cell) -> bool {
        self.index_of(c).is_some_and(|i| self.cost[i] > 0.0)
    }

    /// Step cost onto `c`; `None` if out of bounds or impassable.
    #[inline]
    pub fn move_cost(&self, c: Cell) -> Option<f32> {
        self.index_of(c)
            .map(|i| self.cost[i])
            .filter(|&cost| cost > 0.0)
    }
}

// ── PassGridBuilder ───────────────────────────────────────────────────────────

/// Construct a [`PassGrid`] by painting walls and costs onto open floor.
///
/// # Example
///
/// ```
/// use er_core::Cell;
/// use er_spatial::PassGridBuilder;
///
/// let mut b = PassGridBuilder::new(4, 4);
/// b.wall(Cell::new(1, 1)).unwrap();
/// let grid = b.build();
/// assert!(!grid.passable(Cell::new(1, 1)));
/// assert!(grid.passable(Cell::new(0, 0)));
/// ```
pub struct PassGridBuilder {
    width:  u32,
    height: u32,
    cost:   Vec<f32>,
}

impl PassGridBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, cost: vec![1.0; width as usize * height as usize] }
    }

    fn index(&self, c: Cell) -> SpatialResult<usize> {
        if c.x < 0 || c.z < 0 || c.x as u32 >= self.width || c.z as u32 >= self.height {
            return Err(SpatialError::OutOfBounds(c, self.width, self.height));
        }
        Ok(c.z as usize * self.width as usize + c.x as usize)
    }

    /// Mark `c` impassable.
    pub fn wall(&mut self, c: Cell) -> SpatialResult<&mut Self> {
        let i = self.index(c)?;
        self.cost[i] = 0.0;
        Ok(self)
    }

    /// Wall every cell on the inclusive segment `x = x, z in z0..=z1`.
    pub fn wall_column(&mut self, x: i32, z0: i32, z1: i32) -> SpatialResult<&mut Self> {
        for z in z0.min(z1)..=z0.max(z1) {
            self.wall(Cell::new(x, z))?;
        }
        Ok(self)
    }

    /// Set the step cost of `c` (e.g. 3.0 for rough terrain).
    pub fn cost(&mut self, c: Cell, cost: f32) -> SpatialResult<&mut Self> {
        if !(cost > 0.0) {
            return Err(SpatialError::BadCost(c, cost));
        }
        let i = self.index(c)?;
        self.cost[i] = cost;
        Ok(self)
    }

    pub fn build(self) -> PassGrid {
        PassGrid { width: self.width, height: self.height, cost: self.cost }
    }
}
