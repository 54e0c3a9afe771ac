//! `er-core` — foundational types for the `enroute` hauling planner.
//!
//! This crate is a dependency of every other `er-*` crate.  It intentionally
//! has no `er-*` dependencies.
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `ItemId`, `GroupId`, `ItemKind`                |
//! | [`geo`]         | `Cell` grid coordinate, Euclidean / squared distances     |
//! | [`item`]        | `ItemView`, `Holding`: host item snapshots                |
//! | [`time`]        | `Tick`, `SimClock`                                        |
//! | [`rng`]         | `PlannerRng` (deterministic per-item sampling)            |
//! | [`config`]      | `PlannerSettings`, `PathCheck`, `GroupKindFilter`, `MaxRanges` |
//! | [`diag`]        | `DiagnosticLimiter`: once-per-cooldown warnings           |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |

pub mod config;
pub mod diag;
pub mod error;
pub mod geo;
pub mod ids;
pub mod item;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{GroupKindFilter, MaxRanges, PathCheck, PlannerSettings};
pub use diag::DiagnosticLimiter;
pub use error::{CoreError, CoreResult};
pub use geo::Cell;
pub use ids::{AgentId, GroupId, ItemId, ItemKind};
pub use item::{Holding, ItemView};
pub use rng::PlannerRng;
pub use time::{SimClock, Tick};
