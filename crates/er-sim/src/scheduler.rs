//! Per-agent task queues.
//!
//! Each agent has at most one active task plus a FIFO queue behind it.
//! Planner-issued hauls are pushed in front of the task that triggered
//! them via [`TaskScheduler::preempt`], so the interrupted task resumes as
//! soon as the haul finishes.

use std::collections::VecDeque;
use std::fmt;

use er_core::{AgentId, Cell, ItemId};
use er_planner::{DetourReason, HaulAction};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Take an item to a storage cell.
    Haul,
    /// Take an item to a work site.
    Carry,
    /// Walk to a site and work there for a while.
    Construct,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Haul      => f.write_str("haul"),
            TaskKind::Carry     => f.write_str("carry"),
            TaskKind::Construct => f.write_str("construct"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub kind:       TaskKind,
    /// Store cell, carry destination, or work site.
    pub target:     Cell,
    /// The item moved by `Haul` and `Carry`.
    pub item:       Option<ItemId>,
    /// Remaining work for `Construct`.
    pub work_ticks: u32,
    /// Set on hauls the planner inserted.
    pub reason:     Option<DetourReason>,
}

impl Task {
    pub fn haul(item: ItemId, store_cell: Cell) -> Self {
        Self { kind: TaskKind::Haul, target: store_cell, item: Some(item), work_ticks: 0, reason: None }
    }

    pub fn carry(item: ItemId, to: Cell) -> Self {
        Self { kind: TaskKind::Carry, target: to, item: Some(item), work_ticks: 0, reason: None }
    }

    pub fn construct(site: Cell, work_ticks: u32) -> Self {
        Self { kind: TaskKind::Construct, target: site, item: None, work_ticks, reason: None }
    }

    /// The haul task that carries out a planner action.
    pub fn from_action(action: &HaulAction) -> Self {
        Self { reason: Some(action.reason), ..Self::haul(action.item, action.store_cell) }
    }

    /// Short description used in task reports.
    pub fn describe(&self) -> String {
        match (self.kind, self.item) {
            (TaskKind::Haul, Some(item))  => format!("hauling {item} to {}", self.target),
            (TaskKind::Carry, Some(item)) => format!("carrying {item} to {}", self.target),
            _                             => format!("{} at {}", self.kind, self.target),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct AgentTasks {
    active: Option<Task>,
    queued: VecDeque<Task>,
}

/// Task queues for every agent, indexed by `AgentId`.
#[derive(Clone, Debug, Default)]
pub struct TaskScheduler {
    agents: Vec<AgentTasks>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, agent: AgentId) -> &mut AgentTasks {
        let i = agent.index();
        if i >= self.agents.len() {
            self.agents.resize_with(i + 1, AgentTasks::default);
        }
        &mut self.agents[i]
    }

    /// Append `task` to the back of the agent's queue.
    pub fn enqueue(&mut self, agent: AgentId, task: Task) {
        self.slot(agent).queued.push_back(task);
    }

    /// Promote the next queued task if the agent is idle.  Returns the
    /// newly started task.
    pub fn start_task(&mut self, agent: AgentId) -> Option<&Task> {
        let slot = self.slot(agent);
        if slot.active.is_some() {
            return None;
        }
        slot.active = slot.queued.pop_front();
        slot.active.as_ref()
    }

    /// Make `task` active, pushing the current one back to the queue front.
    pub fn preempt(&mut self, agent: AgentId, task: Task) {
        let slot = self.slot(agent);
        if let Some(current) = slot.active.take() {
            slot.queued.push_front(current);
        }
        slot.active = Some(task);
    }

    pub fn active(&self, agent: AgentId) -> Option<&Task> {
        self.agents.get(agent.index()).and_then(|s| s.active.as_ref())
    }

    pub fn active_mut(&mut self, agent: AgentId) -> Option<&mut Task> {
        self.agents.get_mut(agent.index()).and_then(|s| s.active.as_mut())
    }

    /// End the active task, handing it to `on_finish` first.
    pub fn finish_task(&mut self, agent: AgentId, on_finish: impl FnOnce(&Task)) -> Option<Task> {
        let task = self.slot(agent).active.take()?;
        on_finish(&task);
        Some(task)
    }

    /// Drop the active task and everything queued.  Returns what was dropped,
    /// active task first.
    pub fn interrupt_queue(&mut self, agent: AgentId) -> Vec<Task> {
        let slot = self.slot(agent);
        slot.active.take().into_iter().chain(slot.queued.drain(..)).collect()
    }

    pub fn is_task_active(&self, agent: AgentId, kind: TaskKind) -> bool {
        self.active(agent).is_some_and(|t| t.kind == kind)
    }

    pub fn queued_len(&self, agent: AgentId) -> usize {
        self.agents.get(agent.index()).map_or(0, |s| s.queued.len())
    }

    /// `true` when the agent has no active task and nothing queued.
    pub fn is_idle(&self, agent: AgentId) -> bool {
        self.agents
            .get(agent.index())
            .is_none_or(|s| s.active.is_none() && s.queued.is_empty())
    }
}
