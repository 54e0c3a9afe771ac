//! Simulation observer trait for progress reporting and test probes.

use er_core::{AgentId, Tick};
use er_planner::HaulAction;

use crate::Task;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: haul logger
///
/// ```rust,ignore
/// struct HaulLog;
///
/// impl SimObserver for HaulLog {
///     fn on_action(&mut self, tick: Tick, action: &HaulAction) {
///         println!("{tick}: {} takes {} to {}", action.agent, action.item, action.store_cell);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any agent acts.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called when the planner issues a haul and the sim queues it.
    fn on_action(&mut self, _tick: Tick, _action: &HaulAction) {}

    /// Called when an agent's active task ends, successfully or not.
    fn on_task_finished(&mut self, _tick: Tick, _agent: AgentId, _task: &Task) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
