//! `DetourKind` — which detour an agent is on, with that detour's target.

use std::fmt;

use er_core::Cell;

/// The detour state.  Each variant carries only the fields it needs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum DetourKind {
    #[default]
    Inactive,
    /// Storing an item on the way to `job_target`.
    Opportunity { job_target: Cell },
    /// Moving an item to storage nearer `carry_target` before the carry job.
    BeforeCarry { carry_target: Cell },
    /// Batched pickup in progress with no detour reason.
    InventoryBatch,
    InventoryBatchOpportunity { job_target: Cell },
    InventoryBatchBeforeCarry { carry_target: Cell },
}

impl DetourKind {
    #[inline]
    pub fn is_active(self) -> bool {
        !matches!(self, DetourKind::Inactive)
    }

    #[inline]
    pub fn is_opportunity(self) -> bool {
        matches!(
            self,
            DetourKind::Opportunity { .. } | DetourKind::InventoryBatchOpportunity { .. }
        )
    }

    #[inline]
    pub fn is_before_carry(self) -> bool {
        matches!(
            self,
            DetourKind::BeforeCarry { .. } | DetourKind::InventoryBatchBeforeCarry { .. }
        )
    }

    #[inline]
    pub fn is_inventory_batch(self) -> bool {
        matches!(
            self,
            DetourKind::InventoryBatch
                | DetourKind::InventoryBatchOpportunity { .. }
                | DetourKind::InventoryBatchBeforeCarry { .. }
        )
    }

    /// Only opportunity detours accumulate a chain of hauls.
    #[inline]
    pub fn is_chain_capable(self) -> bool {
        self.is_opportunity()
    }

    pub fn job_target(self) -> Option<Cell> {
        match self {
            DetourKind::Opportunity { job_target }
            | DetourKind::InventoryBatchOpportunity { job_target } => Some(job_target),
            _ => None,
        }
    }

    pub fn carry_target(self) -> Option<Cell> {
        match self {
            DetourKind::BeforeCarry { carry_target }
            | DetourKind::InventoryBatchBeforeCarry { carry_target } => Some(carry_target),
            _ => None,
        }
    }

    /// Where the original task was heading: the job or the carry target.
    #[inline]
    pub fn destination(self) -> Option<Cell> {
        self.job_target().or(self.carry_target())
    }

    /// The inventory-batch-aware counterpart of this kind.
    pub fn with_inventory_batch(self) -> Self {
        match self {
            DetourKind::Inactive => DetourKind::InventoryBatch,
            DetourKind::Opportunity { job_target } => {
                DetourKind::InventoryBatchOpportunity { job_target }
            }
            DetourKind::BeforeCarry { carry_target } => {
                DetourKind::InventoryBatchBeforeCarry { carry_target }
            }
            other => other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DetourKind::Inactive                        => "inactive",
            DetourKind::Opportunity { .. }              => "opportunity",
            DetourKind::BeforeCarry { .. }              => "before-carry",
            DetourKind::InventoryBatch                  => "inventory-batch",
            DetourKind::InventoryBatchOpportunity { .. } => "inventory-batch-opportunity",
            DetourKind::InventoryBatchBeforeCarry { .. } => "inventory-batch-before-carry",
        }
    }
}

impl fmt::Display for DetourKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
