//! Task report decoration.

use er_detour::{Detour, DetourKind};

/// Decorate a task description with the agent's detour, if any.
///
/// ```
/// use er_core::Cell;
/// use er_detour::{Detour, DetourKind};
/// use er_planner::decorate_report;
///
/// let mut d = Detour::new();
/// d.activate(DetourKind::Opportunity { job_target: Cell::new(4, 2) }, Cell::new(0, 0));
/// assert_eq!(
///     decorate_report(Some(&d), "hauling steel"),
///     "Opportunistically hauling steel (en route to (4, 2))",
/// );
/// ```
pub fn decorate_report(detour: Option<&Detour>, base: &str) -> String {
    let Some(detour) = detour else {
        return base.to_owned();
    };
    match detour.kind {
        DetourKind::Opportunity { job_target }
        | DetourKind::InventoryBatchOpportunity { job_target } => {
            format!("Opportunistically {base} (en route to {job_target})")
        }
        DetourKind::BeforeCarry { carry_target }
        | DetourKind::InventoryBatchBeforeCarry { carry_target } => {
            format!("{base} (before carrying to {carry_target})")
        }
        DetourKind::Inactive | DetourKind::InventoryBatch => base.to_owned(),
    }
}
