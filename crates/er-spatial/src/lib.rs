//! `er-spatial` — map passability, path costing, and region reachability.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`grid`]   | `PassGrid` (row-major cost grid), `PassGridBuilder`          |
//! | [`path`]   | `PathCostOracle` trait, `TraverseMode`, `DijkstraPathCost`   |
//! | [`region`] | `Reachability` trait, `RegionBfs` bounded region search      |
//! | [`error`]  | `SpatialError`, `SpatialResult<T>`                           |
//!
//! # Pluggability
//!
//! The planner never does general pathfinding itself.  It asks a
//! [`PathCostOracle`] for traversal cost when the path-check mode calls for
//! it, and a [`Reachability`] oracle otherwise.  Hosts with their own
//! pathfinder implement the traits; the defaults here are enough for tests
//! and small maps.

pub mod error;
pub mod grid;
pub mod path;
pub mod region;


pub use error::{SpatialError, SpatialResult};
pub use grid::{PassGrid, PassGridBuilder};
pub use path::{DijkstraPathCost, PathCostOracle, TraverseMode};
pub use region::{Reachability, RegionBfs};
