//! `er-detour` — the per-agent detour record and its state machine.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                            |
//! |------------|---------------------------------------------------------------------|
//! | [`kind`]   | `DetourKind` — tagged detour state carrying its own target cell     |
//! | [`detour`] | `Detour`, `Haul`, `TripBudget`, `TripLegs`, `TrackOutcome`          |
//! | [`table`]  | `DetourTable` — `AgentId → Detour`, pruned on agent removal         |
//! | [`error`]  | `DetourError`, `DetourResult<T>`                                    |
//!
//! # Lifecycle
//!
//! ```text
//!   Inactive ──activate──▶ Opportunity / BeforeCarry / InventoryBatch*
//!      ▲                        │
//!      │                        ├── track_if_opportune (extend or roll back)
//!      └──────deactivate────────┘   (task finished, queue interrupted)
//! ```
//!
//! Deactivating an opportunity variant stamps `opportunity_done_at`, which
//! the planner uses to debounce the next opportunity for that agent.

pub mod detour;
pub mod error;
pub mod kind;
pub mod table;

#[cfg(test)]
mod tests;

pub use detour::{Detour, Haul, TrackOutcome, TripBudget, TripLegs};
pub use error::{DetourError, DetourResult};
pub use kind::DetourKind;
pub use table::DetourTable;
