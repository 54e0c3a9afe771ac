//! Spatial-subsystem error type.

use thiserror::Error;

use er_core::Cell;

/// Errors produced by `er-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("cell {0} is outside the {1}x{2} grid")]
    OutOfBounds(Cell, u32, u32),

    #[error("move cost at {0} must be positive, got {1}")]
    BadCost(Cell, f32),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
