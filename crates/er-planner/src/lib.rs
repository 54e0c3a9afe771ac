//! `er-planner` — opportunistic and before-carry haul planning.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                          |
//! |------------------|-------------------------------------------------------------------|
//! | [`host`]         | `HaulHost` trait, `AgentView` — what the planner reads            |
//! | [`action`]       | `HaulAction`, `DetourReason` — what the planner returns           |
//! | [`scope`]        | `SearchScope` call-context stack, `CallPhase`, `DecisionCache`    |
//! | [`proximity`]    | `ProximityEvaluator` staged feasibility check                     |
//! | [`opportunity`]  | `OpportunityPlanner` expanding search, `PlanStats`                |
//! | [`before_carry`] | `BeforeCarryPlanner`                                              |
//! | [`hook`]         | `StoreSearchHook`, `HookOutcome` — the reentrant store search     |
//! | [`report`]       | `decorate_report`                                                 |
//! | [`planner`]      | `Planner<P, Q>` — the facade owning all planner state             |
//! | [`error`]        | `PlanError`, `PlanResult<T>`                                      |
//!
//! # Decision points
//!
//! Everything runs synchronously inside the host's per-agent decision point.
//! Infeasible plans return `None`; nothing here fails the caller because a
//! detour did not work out.  Bookkeeping errors (a chain rollback that finds
//! the wrong entry) abort the operation and are logged through a
//! rate-limited [`DiagnosticLimiter`][er_core::DiagnosticLimiter].

pub mod action;
pub mod before_carry;
pub mod error;
pub mod hook;
pub mod host;
pub mod opportunity;
pub mod planner;
pub mod proximity;
pub mod report;
pub mod scope;


pub use action::{DetourReason, HaulAction};
pub use before_carry::BeforeCarryPlanner;
pub use error::{PlanError, PlanResult};
pub use hook::{HookOutcome, StoreSearchHook};
pub use host::{AgentView, HaulHost};
pub use opportunity::{OpportunityPlanner, PlanStats};
pub use planner::Planner;
pub use proximity::{ProximityCheck, ProximityEvaluator, ProximityStage, StageMemo};
pub use report::decorate_report;
pub use scope::{CallPhase, DecisionCache, SearchScope};
