//! `er-sim` — a reference in-memory host for the enroute hauling planner.
//!
//! The planner crates only read the host through
//! [`HaulHost`][er_planner::HaulHost] and hand back
//! [`HaulAction`][er_planner::HaulAction]s.  This crate is the other side of
//! that contract: a small world with agents, items and storage, a task
//! queue per agent, and a tick loop that calls the planner at the decision
//! points a game would.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`world`]     | `World` (implements `HaulHost`), `AgentState`                    |
//! | [`scheduler`] | `TaskScheduler`, `Task`, `TaskKind`                              |
//! | [`batch`]     | `BatchExtension` — inventory-batch pickup and unload             |
//! | [`sim`]       | `Sim` — the tick loop                                            |
//! | [`builder`]   | `SimBuilder`                                                     |
//! | [`observer`]  | `SimObserver`, `NoopObserver`                                    |
//! | [`error`]     | `SimError`, `SimResult<T>`                                       |
//!
//! # Tick loop
//!
//! ```text
//! for tick in now..end_tick:
//!   reindex loose items
//!   for agent in ascending AgentId:
//!     ① Start    — idle agent promotes its next task
//!                    Construct → Planner::plan_opportunity
//!                    Carry     → Planner::plan_before_carry
//!                  a returned haul is reserved and preempts the task
//!     ② Advance  — step one cell / pick up / drop off / work
//!                  batch extension collects on pickup, unloads on drop
//!     ③ Finish   — observer.on_task_finished; a finished planner haul
//!                  calls Planner::on_task_finished
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use er_core::{Cell, ItemKind, PlannerSettings};
//! use er_sim::{NoopObserver, SimBuilder, Task, World};
//!
//! let mut world = World::new(storage, PassGrid::open(32, 8));
//! let agent = world.add_agent(Cell::new(0, 0), 75.0);
//! world.add_item(ItemKind(1), Cell::new(10, 1), 10, 1.0)?;
//! let mut sim = SimBuilder::new(world, PlannerSettings::default())
//!     .task(agent, Task::construct(Cell::new(20, 0), 5))
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod batch;
pub mod builder;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod sim;
pub mod world;


pub use batch::BatchExtension;
pub use builder::{SimBuilder, DEFAULT_RUN_TICKS};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use scheduler::{Task, TaskKind, TaskScheduler};
pub use sim::Sim;
pub use world::{AgentState, World};
