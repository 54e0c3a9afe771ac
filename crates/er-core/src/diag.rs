//! Rate-limited diagnostics.
//!
//! Some failures are expected to originate from unrelated logic interacting
//! with the planner (another extension clearing a queue mid-plan, a host
//! predicate flipping between calls).  They are worth a warning, but not one
//! per call: the same `(agent, key)` pair is reported once and then muted
//! until `cooldown_ticks` have elapsed.

use rustc_hash::FxHashMap;

use crate::{AgentId, Tick};

/// Remembers when each `(agent, key)` diagnostic was last emitted.
#[derive(Debug)]
pub struct DiagnosticLimiter {
    cooldown_ticks: u64,
    last: FxHashMap<(AgentId, &'static str), Tick>,
}

impl Default for DiagnosticLimiter {
    fn default() -> Self {
        Self::new(1)
    }
}

impl DiagnosticLimiter {
    /// A cooldown of 1 mutes repeats for the rest of the current tick.
    pub fn new(cooldown_ticks: u64) -> Self {
        Self { cooldown_ticks: cooldown_ticks.max(1), last: FxHashMap::default() }
    }

    /// `true` if the caller should emit this diagnostic now.  Records the
    /// emission when it returns `true`.
    pub fn should_emit(&mut self, agent: AgentId, key: &'static str, now: Tick) -> bool {
        match self.last.get(&(agent, key)) {
            Some(&at) if now.within(at, self.cooldown_ticks) => false,
            _ => {
                self.last.insert((agent, key), now);
                true
            }
        }
    }

    /// Emit `message` as a `tracing` warning unless it is muted.
    pub fn warn(&mut self, agent: AgentId, key: &'static str, now: Tick, message: &str) {
        if self.should_emit(agent, key, now) {
            tracing::warn!(%agent, key, tick = now.0, "{message}");
        }
    }

    /// Drop all entries for an agent that left the simulation.
    pub fn forget_agent(&mut self, agent: AgentId) {
        self.last.retain(|(a, _), _| *a != agent);
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
