use er_core::ItemId;
use thiserror::Error;

use crate::DetourKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetourError {
    /// A rollback found a different haul than the one it inserted.  `hauls`
    /// is left untouched.
    #[error("rollback expected {expected} but found {found:?}")]
    RollbackMismatch { expected: ItemId, found: Option<ItemId> },

    #[error("detour kind {0} does not chain hauls")]
    NotChainCapable(DetourKind),
}

pub type DetourResult<T> = Result<T, DetourError>;
