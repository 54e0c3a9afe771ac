//! Storage-subsystem error type.

use thiserror::Error;

use er_core::{AgentId, Cell, GroupId, ItemKind};

/// Errors produced by `er-storage`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cell {cell} already belongs to {existing}")]
    DuplicateCell { cell: Cell, existing: GroupId },

    #[error("storage group '{0}' has no cells")]
    EmptyGroup(String),

    #[error("cell {0} is not a storage cell")]
    NotStorage(Cell),

    #[error("cell {cell} holds {held} and cannot take {kind}")]
    KindMismatch { cell: Cell, held: ItemKind, kind: ItemKind },

    #[error("cell {cell} has room for {room} but {count} were placed")]
    Overfull { cell: Cell, room: u32, count: u32 },

    #[error("cell {cell} is reserved by {holder}")]
    Reserved { cell: Cell, holder: AgentId },
}

pub type StorageResult<T> = Result<T, StorageError>;
