//! `er-storage` — storage groups and the storage cell finder.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                         |
//! |------------|------------------------------------------------------------------|
//! | [`group`]  | `StoragePriority`, `GroupKind`, `Acceptance`, `StorageGroup`     |
//! | [`view`]   | `StorageView` — the host storage interface the finder reads      |
//! | [`map`]    | `StorageMap` (groups + R-tree + occupancy), `StorageMapBuilder`  |
//! | [`finder`] | `StorageCellFinder`, `CellQuery`, `SearchStyle`                  |
//! | [`error`]  | `StorageError`, `StorageResult<T>`                               |
//!
//! # Search rules (summary)
//!
//! Groups are visited in descending priority.  The scan stops below the
//! caller's priority floor, and, for untargeted (opportunity) searches, as
//! soon as a group is not strictly better than where the item already sits.
//! Supplying a target point both biases distance toward that point and
//! admits equal-priority groups.

pub mod error;
pub mod finder;
pub mod group;
pub mod map;
pub mod view;

#[cfg(test)]
mod tests;

pub use error::{StorageError, StorageResult};
pub use finder::{CellQuery, SearchStyle, StorageCellFinder};
pub use group::{Acceptance, GroupKind, StorageGroup, StoragePriority};
pub use map::{CellContents, StorageMap, StorageMapBuilder};
pub use view::StorageView;
