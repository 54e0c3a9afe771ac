//! `DetourTable` — the per-agent detour ownership table.

use rustc_hash::FxHashMap;

use er_core::{AgentId, Tick};

use crate::Detour;

/// Owns every agent's [`Detour`].
///
/// Entries are created lazily on first use and survive deactivation (so the
/// opportunity debounce stamp is kept).  They are removed only when the
/// agent leaves the simulation.
#[derive(Debug, Default)]
pub struct DetourTable {
    detours: FxHashMap<AgentId, Detour>,
}

impl DetourTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, agent: AgentId) -> Option<&Detour> {
        self.detours.get(&agent)
    }

    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut Detour> {
        self.detours.get_mut(&agent)
    }

    /// The agent's detour, creating an inactive one if absent.
    pub fn get_or_insert(&mut self, agent: AgentId) -> &mut Detour {
        self.detours.entry(agent).or_default()
    }

    /// The agent's detour if it is active.
    pub fn active(&self, agent: AgentId) -> Option<&Detour> {
        self.get(agent).filter(|d| d.is_active())
    }

    /// Deactivate the agent's detour.  Returns `true` if it was active.
    pub fn deactivate(&mut self, agent: AgentId, now: Tick) -> bool {
        match self.detours.get_mut(&agent) {
            Some(d) if d.is_active() => {
                d.deactivate(now);
                true
            }
            _ => false,
        }
    }

    /// Drop the agent's entry entirely.
    pub fn remove(&mut self, agent: AgentId) -> Option<Detour> {
        self.detours.remove(&agent)
    }

    pub fn len(&self) -> usize {
        self.detours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detours.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.detours.values().filter(|d| d.is_active()).count()
    }
}
