use er_core::{AgentId, CoreError};
use er_detour::DetourError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid planner settings: {0}")]
    Settings(#[from] CoreError),

    #[error("detour bookkeeping failed: {0}")]
    Detour(#[from] DetourError),

    #[error("host does not know agent {0}")]
    UnknownAgent(AgentId),
}

pub type PlanResult<T> = Result<T, PlanError>;
