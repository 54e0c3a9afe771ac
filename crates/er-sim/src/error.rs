use thiserror::Error;

use er_core::{AgentId, Cell, ItemId};
use er_planner::PlanError;
use er_storage::StorageError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("unknown item {0}")]
    UnknownItem(ItemId),

    #[error("{item} is not on the ground at {at}")]
    ItemNotThere { item: ItemId, at: Cell },

    #[error("{agent} already holds {held}")]
    HandsFull { agent: AgentId, held: ItemId },

    #[error("{agent} is not holding {item}")]
    NotHolding { agent: AgentId, item: ItemId },

    #[error("planner error: {0}")]
    Plan(#[from] PlanError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type SimResult<T> = Result<T, SimError>;
